//! GUID-tagged property sets for the connection handshake.
//!
//! A connect request carries two property sets plus an array of four
//! extension sets. Each set has a fixed per-id encoding rule; callers select
//! which ids to include through configuration. Ids outside a set's rule
//! table are silently skipped; that permissiveness is a test affordance
//! (invalid ids go straight to the server) and must not be "fixed".

use uuid::Uuid;

use crate::codec::{MessageWriter, Value, Variant, VType};
use crate::error::Result;
use crate::protocol::consts::{
    DBPROPSET_CIFRMWRKCORE_EXT, DBPROPSET_FSCIFRMWRK_EXT, EMPTY_GUID,
};

/// Column reference carried by each property. Connect-time properties use
/// an empty one (nil GUID, selector 0).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnId {
    pub kind: u32,
    pub guid: Uuid,
    pub id: u32,
}

/// DBKIND code for GUID + numeric id column references.
const DBKIND_GUID_PROPID: u32 = 1;

impl ColumnId {
    /// The empty column reference used for connect-time properties.
    pub fn empty() -> Self {
        Self {
            kind: DBKIND_GUID_PROPID,
            guid: EMPTY_GUID,
            id: 0,
        }
    }

    fn encode_into(&self, w: &mut MessageWriter) {
        w.put_u32(self.kind);
        w.align_to(8);
        w.put_guid(&self.guid);
        w.put_u32(self.id);
    }
}

/// A single property inside a set.
#[derive(Debug, Clone, PartialEq)]
pub struct Property {
    pub id: u32,
    pub options: u32,
    pub status: u32,
    pub colid: ColumnId,
    pub value: Variant,
}

/// An ordered, GUID-tagged group of properties.
#[derive(Debug, Clone, PartialEq)]
pub struct PropertySet {
    pub guid: Uuid,
    pub props: Vec<Property>,
}

impl PropertySet {
    pub fn new(guid: Uuid) -> Self {
        Self {
            guid,
            props: Vec::new(),
        }
    }

    /// Append a property with default options/status and an empty column
    /// reference.
    pub fn push(&mut self, id: u32, value: Variant) {
        self.props.push(Property {
            id,
            options: 0,
            status: 0,
            colid: ColumnId::empty(),
            value,
        });
    }

    /// Encode: 8-aligned set GUID, property count, then each property.
    pub fn encode_into(&self, w: &mut MessageWriter) -> Result<()> {
        w.align_to(8);
        w.put_guid(&self.guid);
        w.put_u32(self.props.len() as u32);
        for prop in &self.props {
            w.align_to(4);
            w.put_u32(prop.id);
            w.put_u32(prop.options);
            w.put_u32(prop.status);
            prop.colid.encode_into(w);
            w.align_to(4);
            prop.value.encode_into(w)?;
        }
        Ok(())
    }
}

/// Connect set 1 (DBPROPSET_FSCIFRMWRK_EXT): catalog selection.
pub fn connect_propset_one(ids: &[u32], catalog_name: &str) -> PropertySet {
    let mut set = PropertySet::new(DBPROPSET_FSCIFRMWRK_EXT);
    for &id in ids {
        match id {
            2 => set.push(2, Variant::Scalar(Value::Lpwstr(catalog_name.to_owned()))),
            3 => set.push(
                3,
                Variant::Vector {
                    ty: VType::Lpwstr,
                    elems: vec![Value::Lpwstr(String::new())],
                },
            ),
            4 => set.push(
                4,
                Variant::Vector {
                    ty: VType::I4,
                    elems: vec![Value::I4(1)],
                },
            ),
            7 => set.push(7, Variant::Scalar(Value::I4(0))),
            _ => {} // unknown ids pass through silently
        }
    }
    set
}

/// Connect set 2 (DBPROPSET_CIFRMWRKCORE_EXT): server machine name.
pub fn connect_propset_two(ids: &[u32], server_name: &str) -> PropertySet {
    let mut set = PropertySet::new(DBPROPSET_CIFRMWRKCORE_EXT);
    for &id in ids {
        match id {
            2 => set.push(2, Variant::Scalar(Value::Bstr(server_name.to_owned()))),
            _ => {}
        }
    }
    set
}

/// Extension set 1 (rowset extension): language locale.
pub fn ext_propset_locale(guid: Uuid, ids: &[u32], language_locale: &str) -> PropertySet {
    let mut set = PropertySet::new(guid);
    for &id in ids {
        match id {
            2 | 6 | 7 => set.push(id, Variant::Scalar(Value::I4(0))),
            3 => set.push(
                3,
                Variant::Scalar(Value::Bstr(language_locale.to_owned())),
            ),
            4 | 5 => set.push(id, Variant::Scalar(Value::Bstr(String::new()))),
            _ => {}
        }
    }
    set
}

/// Extension set 2 (query extension): feature flags, all off.
pub fn ext_propset_flags(guid: Uuid, ids: &[u32]) -> PropertySet {
    let mut set = PropertySet::new(guid);
    for &id in ids {
        match id {
            2 | 3 | 4 | 5 | 8 | 10 | 12 | 13 | 14 => {
                set.push(id, Variant::Scalar(Value::Bool(false)));
            }
            6 => set.push(6, Variant::Scalar(Value::Bstr(String::new()))),
            _ => {}
        }
    }
    set
}

/// Extension set 3: server machine name.
pub fn ext_propset_server(guid: Uuid, ids: &[u32], server_name: &str) -> PropertySet {
    let mut set = PropertySet::new(guid);
    for &id in ids {
        match id {
            2 => set.push(2, Variant::Scalar(Value::Bstr(server_name.to_owned()))),
            _ => {}
        }
    }
    set
}

/// Extension set 4: catalog name plus safe-array probes.
pub fn ext_propset_catalog(guid: Uuid, ids: &[u32], catalog_name: &str) -> PropertySet {
    let mut set = PropertySet::new(guid);
    for &id in ids {
        match id {
            2 => set.push(2, Variant::Scalar(Value::Bstr(catalog_name.to_owned()))),
            3 => set.push(
                3,
                Variant::Array {
                    ty: VType::Bstr,
                    features: 0,
                    lower_bound: 0,
                    elems: vec![Value::Bstr(String::new())],
                },
            ),
            4 => set.push(
                4,
                Variant::Array {
                    ty: VType::I4,
                    features: 0,
                    lower_bound: 0,
                    elems: vec![Value::I4(0)],
                },
            ),
            _ => {}
        }
    }
    set
}
