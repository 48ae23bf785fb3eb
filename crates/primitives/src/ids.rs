use arbitrary::Arbitrary;
use borsh::{BorshDeserialize, BorshSerialize};
use serde::{Deserialize, Serialize};

use crate::buf::Buf32;

/// Address of a shared multi-party account object.
#[derive(
    Copy,
    Clone,
    Eq,
    PartialEq,
    Ord,
    PartialOrd,
    Hash,
    Arbitrary,
    BorshDeserialize,
    BorshSerialize,
    Deserialize,
    Serialize,
)]
pub struct AccountAddr(Buf32);

impl_opaque_thin_wrapper!(AccountAddr => Buf32);
impl_buf_display!(AccountAddr);

/// Identity of a single authorized party, as known to the host ledger's
/// transaction model.
#[derive(
    Copy,
    Clone,
    Eq,
    PartialEq,
    Ord,
    PartialOrd,
    Hash,
    Arbitrary,
    BorshDeserialize,
    BorshSerialize,
    Deserialize,
    Serialize,
)]
pub struct MemberKey(Buf32);

impl_opaque_thin_wrapper!(MemberKey => Buf32);
impl_buf_display!(MemberKey);

/// On-ledger identity of a published package.
#[derive(
    Copy,
    Clone,
    Eq,
    PartialEq,
    Ord,
    PartialOrd,
    Hash,
    Arbitrary,
    BorshDeserialize,
    BorshSerialize,
    Deserialize,
    Serialize,
)]
pub struct PackageId(Buf32);

impl_opaque_thin_wrapper!(PackageId => Buf32);
impl_buf_display!(PackageId);

/// Unique identity of a ledger object, as allocated by the host ledger.
#[derive(
    Copy,
    Clone,
    Eq,
    PartialEq,
    Ord,
    PartialOrd,
    Hash,
    Arbitrary,
    BorshDeserialize,
    BorshSerialize,
    Deserialize,
    Serialize,
)]
pub struct ObjectId(Buf32);

impl_opaque_thin_wrapper!(ObjectId => Buf32);
impl_buf_display!(ObjectId);
