//! In-memory ledger and submitter used by unit tests.

use crate::error::ComposeError;
use crate::transport::{CoinObject, LedgerReader, ObjectData, OwnedObject, SubmitReceipt, Submitter};
use crate::types::{normalize_type_tag, ObjectId, PoolDescriptor, SuiAddress};
use crate::unit::ValidatedUnit;
use std::cell::RefCell;
use std::collections::HashMap;

pub const TOKEN_TYPE: &str = "0x1e20267bbc14a1c19399473165685a409f36f161583650e09981ef936560ee44::ripleys::RIPLEYS";

pub fn test_package() -> ObjectId {
    "0x5d8fbbf6f908a4af8c6d072669a462d53e03eb3c1d863bd0359dc818c69ea706"
        .parse()
        .unwrap()
}

pub fn test_pool() -> PoolDescriptor {
    PoolDescriptor::new(
        "0x4b7b661cb29e49557cd8118d34357b2d09e2e959c37188143feac31a9f2f3e79"
            .parse()
            .unwrap(),
        TOKEN_TYPE,
    )
}

pub fn sender() -> SuiAddress {
    "0xa11ce".parse().unwrap()
}

#[derive(Default)]
pub struct MemoryLedger {
    owned: Vec<(SuiAddress, OwnedObject)>,
    objects: HashMap<ObjectId, ObjectData>,
    coins: Vec<(SuiAddress, String, CoinObject)>,
}

impl MemoryLedger {
    pub fn give(&mut self, owner: SuiAddress, object_id: ObjectId, object_type: &str) {
        self.owned.push((
            owner,
            OwnedObject {
                object_id,
                version: 1,
                object_type: object_type.to_string(),
            },
        ));
    }

    pub fn put_object(
        &mut self,
        object_id: ObjectId,
        object_type: &str,
        fields: serde_json::Value,
    ) {
        self.objects.insert(
            object_id,
            ObjectData {
                object_id,
                object_type: object_type.to_string(),
                fields,
            },
        );
    }

    pub fn add_coin(
        &mut self,
        owner: SuiAddress,
        coin_type: &str,
        object_id: ObjectId,
        balance: u64,
    ) {
        self.coins.push((
            owner,
            coin_type.to_string(),
            CoinObject { object_id, balance },
        ));
    }
}

impl LedgerReader for MemoryLedger {
    fn owned_objects(
        &self,
        owner: &SuiAddress,
        struct_type: &str,
    ) -> Result<Vec<OwnedObject>, ComposeError> {
        let wanted = normalize_type_tag(struct_type);
        Ok(self
            .owned
            .iter()
            .filter(|(o, object)| o == owner && normalize_type_tag(&object.object_type) == wanted)
            .map(|(_, object)| object.clone())
            .collect())
    }

    fn object(&self, id: &ObjectId) -> Result<Option<ObjectData>, ComposeError> {
        Ok(self.objects.get(id).cloned())
    }

    fn coins(&self, owner: &SuiAddress, coin_type: &str) -> Result<Vec<CoinObject>, ComposeError> {
        let wanted = normalize_type_tag(coin_type);
        Ok(self
            .coins
            .iter()
            .filter(|(o, ty, _)| o == owner && normalize_type_tag(ty) == wanted)
            .map(|(_, _, coin)| *coin)
            .collect())
    }
}

#[derive(Default)]
pub struct RecordingSubmitter {
    pub submitted: RefCell<Vec<(SuiAddress, ValidatedUnit)>>,
}

impl Submitter for RecordingSubmitter {
    fn submit(
        &self,
        sender: &SuiAddress,
        unit: &ValidatedUnit,
    ) -> Result<SubmitReceipt, ComposeError> {
        self.submitted.borrow_mut().push((*sender, unit.clone()));
        Ok(SubmitReceipt {
            digest: unit.digest_hex(),
            destination: "memory".to_string(),
        })
    }
}
