//! Restriction trees: the boolean predicate sent with query creation.
//!
//! A restriction is a tree of nodes. Leaf nodes compare a property against
//! a value (`Property`) or match a phrase against indexed content
//! (`Content`); interior nodes combine children with a boolean operator.
//! Every node carries the fixed relevance weight.
//!
//! Only the scope+content shape is built by [`RestrictionNode::scope_and_content`];
//! other tree shapes are composed directly from `RestrictionNode` values.

use uuid::Uuid;

use crate::codec::{MessageWriter, Variant};
use crate::error::Result;
use crate::protocol::consts::NODE_WEIGHT;

/// Selector half of a full property spec: numeric id or string name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PropSpec {
    Id(u32),
    Name(String),
}

/// Identifies a column or restriction target: GUID plus selector.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FullPropSpec {
    pub guid: Uuid,
    pub spec: PropSpec,
}

/// Selector kind codes on the wire.
const PRSPEC_LPWSTR: u32 = 0;
const PRSPEC_PROPID: u32 = 1;

impl FullPropSpec {
    /// Spec addressing a property by numeric id.
    pub fn by_id(guid: Uuid, id: u32) -> Self {
        Self {
            guid,
            spec: PropSpec::Id(id),
        }
    }

    /// Spec addressing a property by name.
    pub fn by_name(guid: Uuid, name: impl Into<String>) -> Self {
        Self {
            guid,
            spec: PropSpec::Name(name.into()),
        }
    }

    /// Encode: 8-aligned GUID, selector kind, then id or counted name.
    pub fn encode_into(&self, w: &mut MessageWriter) {
        w.align_to(8);
        w.put_guid(&self.guid);
        match &self.spec {
            PropSpec::Id(id) => {
                w.put_u32(PRSPEC_PROPID);
                w.put_u32(*id);
            }
            PropSpec::Name(name) => {
                w.put_u32(PRSPEC_LPWSTR);
                w.put_u32(name.encode_utf16().count() as u32);
                w.put_unicode(name);
                w.align_to(4);
            }
        }
    }
}

/// Boolean operators for interior nodes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u32)]
pub enum BoolOp {
    And = 0x1,
    Or = 0x2,
    Not = 0x3,
}

/// Relational operators for property restrictions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u32)]
pub enum Relop {
    Lt = 0x0,
    Le = 0x1,
    Gt = 0x2,
    Ge = 0x3,
    Eq = 0x4,
    Ne = 0x5,
}

/// Phrase generation methods for content restrictions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u32)]
pub enum GenerateMethod {
    Exact = 0x0,
    Prefix = 0x1,
    Inflection = 0x2,
}

/// Node type codes on the wire. Boolean nodes reuse the operator code.
const RT_CONTENT: u32 = 4;
const RT_PROPERTY: u32 = 5;

/// A node of the restriction tree.
#[derive(Debug, Clone, PartialEq)]
pub enum RestrictionNode {
    /// Compare a property against a variant value.
    Property {
        relop: Relop,
        prop: FullPropSpec,
        value: Variant,
        lcid: u32,
    },
    /// Match a phrase against indexed content.
    Content {
        prop: FullPropSpec,
        phrase: String,
        lcid: u32,
        method: GenerateMethod,
    },
    /// Boolean combination of child restrictions.
    Node {
        op: BoolOp,
        children: Vec<RestrictionNode>,
    },
}

impl RestrictionNode {
    /// The wire type code for this node.
    pub fn node_type(&self) -> u32 {
        match self {
            RestrictionNode::Property { .. } => RT_PROPERTY,
            RestrictionNode::Content { .. } => RT_CONTENT,
            RestrictionNode::Node { op, .. } => *op as u32,
        }
    }

    /// The fixed scope+content predicate used by query creation:
    /// `AND(property(scope EQ path), content(phrase, EXACT))`, both
    /// children at the default weight.
    pub fn scope_and_content(phrase: &str, scope: &str, lcid: u32) -> Self {
        use crate::codec::Value;
        use crate::protocol::consts::{system_search_contents, system_search_scope};

        RestrictionNode::Node {
            op: BoolOp::And,
            children: vec![
                RestrictionNode::Property {
                    relop: Relop::Eq,
                    prop: system_search_scope(),
                    value: Variant::Scalar(Value::Lpwstr(scope.to_owned())),
                    lcid,
                },
                RestrictionNode::Content {
                    prop: system_search_contents(),
                    phrase: phrase.to_owned(),
                    lcid,
                    method: GenerateMethod::Exact,
                },
            ],
        }
    }

    /// Encode this node: type code, weight, then the type-specific body.
    pub fn encode_into(&self, w: &mut MessageWriter) -> Result<()> {
        w.put_u32(self.node_type());
        w.put_u32(NODE_WEIGHT);
        match self {
            RestrictionNode::Property {
                relop,
                prop,
                value,
                lcid,
            } => {
                w.put_u32(*relop as u32);
                prop.encode_into(w);
                w.align_to(4);
                value.encode_into(w)?;
                w.align_to(4);
                w.put_u32(*lcid);
            }
            RestrictionNode::Content {
                prop,
                phrase,
                lcid,
                method,
            } => {
                prop.encode_into(w);
                w.put_u32(phrase.encode_utf16().count() as u32);
                w.put_unicode(phrase);
                w.align_to(4);
                w.put_u32(*lcid);
                w.put_u32(*method as u32);
            }
            RestrictionNode::Node { children, .. } => {
                w.put_u32(children.len() as u32);
                for child in children {
                    w.align_to(4);
                    child.encode_into(w)?;
                }
            }
        }
        Ok(())
    }
}

/// The restriction array wrapper carried by query-creation messages.
/// Always one present restriction tree.
#[derive(Debug, Clone, PartialEq)]
pub struct RestrictionArray(pub RestrictionNode);

impl RestrictionArray {
    pub fn encode_into(&self, w: &mut MessageWriter) -> Result<()> {
        w.put_u8(1); // count
        w.put_u8(1); // isPresent
        w.align_to(4);
        self.0.encode_into(w)
    }
}
