use std::collections::BTreeMap;
use std::fmt;
use std::path::Path;

use anyhow::{Context, Result};
use serde::de::{self, SeqAccess, Visitor};
use serde::ser::SerializeTuple;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// One square region of the tile grid: either a single approximate
/// bytes-per-tile value, or four children covering the NW, NE, SW and SE
/// quadrants at half the side length.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QuadNode {
    Leaf(u64),
    Branch(Box<[QuadNode; 4]>),
}

impl QuadNode {
    pub fn branch(nw: QuadNode, ne: QuadNode, sw: QuadNode, se: QuadNode) -> Self {
        QuadNode::Branch(Box::new([nw, ne, sw, se]))
    }
}

impl Serialize for QuadNode {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match self {
            QuadNode::Leaf(value) => serializer.serialize_u64(*value),
            QuadNode::Branch(children) => {
                let mut tuple = serializer.serialize_tuple(4)?;
                for child in children.iter() {
                    tuple.serialize_element(child)?;
                }
                tuple.end()
            }
        }
    }
}

struct QuadNodeVisitor;

impl<'de> Visitor<'de> for QuadNodeVisitor {
    type Value = QuadNode;

    fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
        formatter.write_str("a non-negative integer or an array of 4 nodes")
    }

    fn visit_u64<E>(self, value: u64) -> Result<QuadNode, E>
    where
        E: de::Error,
    {
        Ok(QuadNode::Leaf(value))
    }

    fn visit_i64<E>(self, value: i64) -> Result<QuadNode, E>
    where
        E: de::Error,
    {
        if value < 0 {
            return Err(E::custom("leaf value must not be negative"));
        }
        Ok(QuadNode::Leaf(value as u64))
    }

    fn visit_f64<E>(self, value: f64) -> Result<QuadNode, E>
    where
        E: de::Error,
    {
        if !value.is_finite() || value < 0.0 || value.fract() != 0.0 {
            return Err(E::custom("leaf value must be a non-negative integer"));
        }
        Ok(QuadNode::Leaf(value as u64))
    }

    fn visit_seq<A>(self, mut seq: A) -> Result<QuadNode, A::Error>
    where
        A: SeqAccess<'de>,
    {
        let mut children = Vec::with_capacity(4);
        while let Some(child) = seq.next_element::<QuadNode>()? {
            if children.len() == 4 {
                return Err(de::Error::custom("branch must have exactly 4 child nodes"));
            }
            children.push(child);
        }
        let children: [QuadNode; 4] = children
            .try_into()
            .map_err(|_| de::Error::custom("branch must have exactly 4 child nodes"))?;
        Ok(QuadNode::Branch(Box::new(children)))
    }
}

impl<'de> Deserialize<'de> for QuadNode {
    fn deserialize<D>(deserializer: D) -> Result<QuadNode, D::Error>
    where
        D: Deserializer<'de>,
    {
        deserializer.deserialize_any(QuadNodeVisitor)
    }
}

/// Persisted size index: one quadtree root per zoom level, each covering the
/// full 2^z x 2^z grid. Built once per dataset version, read-only afterwards.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SizeIndex {
    pub levels: BTreeMap<u8, QuadNode>,
}

impl SizeIndex {
    pub fn from_str(json: &str) -> Result<Self> {
        serde_json::from_str(json).context("parse size index")
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let json = std::fs::read_to_string(path)
            .with_context(|| format!("read size index: {}", path.display()))?;
        SizeIndex::from_str(&json)
            .with_context(|| format!("invalid size index: {}", path.display()))
    }

    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string(self).context("serialize size index")
    }

    pub fn write_file(&self, path: &Path) -> Result<()> {
        let json = self.to_json()?;
        std::fs::write(path, json)
            .with_context(|| format!("write size index: {}", path.display()))?;
        Ok(())
    }
}
