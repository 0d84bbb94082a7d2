//! Capability handles and their lookup.
//!
//! Administrative calls are authorized by owning a capability object. The
//! handle type records which capability it is, so an `AdminCap` cannot be
//! passed where a `WeightHookAdminCap` is expected.

use crate::error::ComposeError;
use crate::ledger::{LIQUID_STAKING_MODULE, WEIGHT_MODULE};
use crate::transport::LedgerReader;
use crate::types::{normalize_type_tag, ObjectId, SuiAddress};
use crate::unit::{Argument, TransactionUnit};
use std::marker::PhantomData;
use tracing::{debug, warn};

/// Describes one capability struct of the protocol.
pub trait CapabilityKind {
    /// Module declaring the struct.
    const MODULE: &'static str;
    /// Struct name.
    const STRUCT: &'static str;

    /// `<package>::<module>::<Struct><token_type>`.
    fn struct_type(package: &ObjectId, token_type: &str) -> String {
        format!("{package}::{}::{}<{token_type}>", Self::MODULE, Self::STRUCT)
    }
}

/// Marker for `liquid_staking::AdminCap`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PoolAdmin {}

impl CapabilityKind for PoolAdmin {
    const MODULE: &'static str = LIQUID_STAKING_MODULE;
    const STRUCT: &'static str = "AdminCap";
}

/// Marker for `weight::WeightHookAdminCap`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WeightHookAdmin {}

impl CapabilityKind for WeightHookAdmin {
    const MODULE: &'static str = WEIGHT_MODULE;
    const STRUCT: &'static str = "WeightHookAdminCap";
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Source {
    Owned(ObjectId),
    Produced(Argument),
}

/// Typed handle to a capability, either an owned ledger object or a value
/// produced earlier in the same unit.
#[derive(Debug, PartialEq, Eq)]
pub struct Capability<K: CapabilityKind> {
    source: Source,
    _kind: PhantomData<K>,
}

/// Pool administration capability.
pub type AdminCap = Capability<PoolAdmin>;
/// Weight hook administration capability.
pub type WeightHookAdminCap = Capability<WeightHookAdmin>;

impl<K: CapabilityKind> Capability<K> {
    /// Handle to a capability object the sender owns.
    pub fn owned(id: ObjectId) -> Self {
        Self {
            source: Source::Owned(id),
            _kind: PhantomData,
        }
    }

    pub(crate) fn produced(argument: Argument) -> Self {
        Self {
            source: Source::Produced(argument),
            _kind: PhantomData,
        }
    }

    /// Ledger id, when the capability already exists on chain.
    pub fn object_id(&self) -> Option<ObjectId> {
        match self.source {
            Source::Owned(id) => Some(id),
            Source::Produced(_) => None,
        }
    }

    pub(crate) fn argument(&self, unit: &mut TransactionUnit) -> Argument {
        match self.source {
            Source::Owned(id) => unit.owned_object(id),
            Source::Produced(argument) => argument,
        }
    }

    /// Sends the capability to `recipient` within `unit`.
    pub fn transfer_to(self, unit: &mut TransactionUnit, recipient: &SuiAddress) {
        let argument = self.argument(unit);
        unit.transfer_objects(vec![argument], recipient);
    }
}

/// Finds capabilities owned by an account.
pub struct CapabilityResolver<'a, R: LedgerReader + ?Sized> {
    reader: &'a R,
    package: ObjectId,
}

impl<'a, R: LedgerReader + ?Sized> CapabilityResolver<'a, R> {
    /// Resolver for capabilities declared by `package`.
    pub fn new(reader: &'a R, package: ObjectId) -> Self {
        Self { reader, package }
    }

    /// The capability of kind `K` for `token_type` owned by `owner`.
    ///
    /// When several match, the one with the smallest object id is returned.
    pub fn find_capability<K: CapabilityKind>(
        &self,
        owner: &SuiAddress,
        token_type: &str,
    ) -> Result<Capability<K>, ComposeError> {
        let struct_type = K::struct_type(&self.package, token_type);
        let wanted = normalize_type_tag(&struct_type);
        let mut matches: Vec<ObjectId> = self
            .reader
            .owned_objects(owner, &struct_type)?
            .into_iter()
            .filter(|object| normalize_type_tag(&object.object_type) == wanted)
            .map(|object| object.object_id)
            .collect();
        matches.sort();
        matches.dedup();
        debug!(evt = "capability_lookup", %owner, %struct_type, found = matches.len());
        if matches.len() > 1 {
            warn!(
                evt = "capability_ambiguous",
                %owner,
                count = matches.len(),
                "several capabilities match; using the smallest object id"
            );
        }
        match matches.first() {
            Some(id) => Ok(Capability::owned(*id)),
            None => Err(ComposeError::CapabilityNotFound {
                owner: *owner,
                struct_type,
            }),
        }
    }

    /// Shorthand for the pool [`AdminCap`].
    pub fn find_admin_cap(
        &self,
        owner: &SuiAddress,
        token_type: &str,
    ) -> Result<AdminCap, ComposeError> {
        self.find_capability::<PoolAdmin>(owner, token_type)
    }

    /// Shorthand for the [`WeightHookAdminCap`].
    pub fn find_weight_hook_admin_cap(
        &self,
        owner: &SuiAddress,
        token_type: &str,
    ) -> Result<WeightHookAdminCap, ComposeError> {
        self.find_capability::<WeightHookAdmin>(owner, token_type)
    }
}
