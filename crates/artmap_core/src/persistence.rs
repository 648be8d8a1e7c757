//! Little-endian binary persistence of trained networks and map fields.
//!
//! Fields are written in a fixed order with no header. `bool` takes one byte,
//! lengths and counts are `i32`, real values `f32`.
//!
//! ```text
//! Network:  vigilance alpha input_size tracking learning reliability   (f32 x6)
//!           history_size history_cursor compression_count              (i32 x3)
//!           match_track complement wta test_match                      (u8 x4)
//!           F1 (len + values), prototypes (count + len/values each),
//!           history (len + values)
//!
//! MapField: learning_fraction vigilance (f32 x2), node_count
//!           input_class_count (i32 x2), force_vigilance (u8),
//!           class table  [network][class] -> (node i32, weight f32)*,
//!           node table   [node][network]  -> (class i32, weight f32)*
//! ```
//!
//! Loading rejects negative counts, bad booleans and edge tables whose two
//! directions disagree.

use std::fs::File;
use std::io::{BufReader, BufWriter, Read, Write};
use std::path::Path;

use byteorder::{LittleEndian, ReadBytesExt, WriteBytesExt};
use log::info;

use crate::config::{ActivationMode, NetworkConfig};
use crate::error::{ArtError, Result};
use crate::mapfield::{ClassEdge, MapField, NodeEdge};
use crate::network::{Network, VigilanceHistory};

/// Binary serialization shared by every trainable component.
pub trait Persist: Sized {
    fn write_to<W: Write>(&self, writer: &mut W) -> Result<()>;

    fn read_from<R: Read>(reader: &mut R) -> Result<Self>;

    fn to_bytes(&self) -> Result<Vec<u8>> {
        let mut buf = Vec::new();
        self.write_to(&mut buf)?;
        Ok(buf)
    }

    fn from_bytes(mut bytes: &[u8]) -> Result<Self> {
        Self::read_from(&mut bytes)
    }

    fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let path = path.as_ref();
        let mut writer = BufWriter::new(File::create(path)?);
        self.write_to(&mut writer)?;
        writer.flush()?;
        info!("saved {}", path.display());
        Ok(())
    }

    fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let mut reader = BufReader::new(File::open(path)?);
        let loaded = Self::read_from(&mut reader)?;
        info!("loaded {}", path.display());
        Ok(loaded)
    }
}

fn write_count<W: Write>(writer: &mut W, count: usize) -> Result<()> {
    let count = i32::try_from(count)
        .map_err(|_| ArtError::Corrupt(format!("count {count} exceeds i32")))?;
    writer.write_i32::<LittleEndian>(count)?;
    Ok(())
}

fn read_count<R: Read>(reader: &mut R, what: &str) -> Result<usize> {
    let count = reader.read_i32::<LittleEndian>()?;
    usize::try_from(count).map_err(|_| ArtError::Corrupt(format!("negative {what}: {count}")))
}

fn write_bool<W: Write>(writer: &mut W, value: bool) -> Result<()> {
    writer.write_u8(u8::from(value))?;
    Ok(())
}

fn read_bool<R: Read>(reader: &mut R, what: &str) -> Result<bool> {
    match reader.read_u8()? {
        0 => Ok(false),
        1 => Ok(true),
        other => Err(ArtError::Corrupt(format!("{what} flag is {other}"))),
    }
}

fn write_values<W: Write>(writer: &mut W, values: &[f32]) -> Result<()> {
    write_count(writer, values.len())?;
    for &v in values {
        writer.write_f32::<LittleEndian>(v)?;
    }
    Ok(())
}

fn read_values<R: Read>(reader: &mut R, what: &str) -> Result<Vec<f32>> {
    let len = read_count(reader, what)?;
    // grown while reading so a bogus length fails on EOF, not on allocation
    let mut values = Vec::new();
    for _ in 0..len {
        values.push(reader.read_f32::<LittleEndian>()?);
    }
    Ok(values)
}

impl Persist for Network {
    fn write_to<W: Write>(&self, writer: &mut W) -> Result<()> {
        for v in [
            self.vigilance,
            self.alpha,
            self.input_size,
            self.tracking_value,
            self.learning_fraction,
            self.reliability,
        ] {
            writer.write_f32::<LittleEndian>(v)?;
        }

        write_count(writer, self.history.capacity())?;
        write_count(writer, self.history.cursor())?;
        write_count(writer, self.compression_count as usize)?;

        for flag in [
            self.match_track,
            self.complement_coding,
            self.winner_take_all,
            self.test_match,
        ] {
            write_bool(writer, flag)?;
        }

        write_values(writer, &self.f1)?;
        write_count(writer, self.store.len())?;
        for (_, prototype) in self.store.iter() {
            write_values(writer, prototype)?;
        }
        write_values(writer, self.history.values())?;
        Ok(())
    }

    fn read_from<R: Read>(reader: &mut R) -> Result<Self> {
        let vigilance = reader.read_f32::<LittleEndian>()?;
        let alpha = reader.read_f32::<LittleEndian>()?;
        let input_size = reader.read_f32::<LittleEndian>()?;
        let tracking_value = reader.read_f32::<LittleEndian>()?;
        let learning_fraction = reader.read_f32::<LittleEndian>()?;
        let reliability = reader.read_f32::<LittleEndian>()?;

        let history_size = read_count(reader, "history size")?;
        let history_cursor = read_count(reader, "history cursor")?;
        let compression_count = read_count(reader, "compression count")?;

        let match_track = read_bool(reader, "match track")?;
        let complement_coding = read_bool(reader, "complement coding")?;
        let winner_take_all = read_bool(reader, "winner-take-all")?;
        let test_match = read_bool(reader, "test match")?;

        let f1 = read_values(reader, "F1 length")?;
        let count = read_count(reader, "prototype count")?;
        let mut prototypes = Vec::new();
        for _ in 0..count {
            prototypes.push(read_values(reader, "prototype length")?);
        }
        let history = read_values(reader, "history length")?;

        if history.len() > history_size {
            return Err(ArtError::Corrupt(format!(
                "{} history values for capacity {history_size}",
                history.len()
            )));
        }
        if history_cursor >= history_size.max(1) {
            return Err(ArtError::Corrupt(format!(
                "history cursor {history_cursor} outside capacity {history_size}"
            )));
        }

        let config = NetworkConfig {
            match_track,
            complement_coding,
            winner_take_all,
            vigilance,
            alpha,
            tracking_value,
            learning_fraction,
            reliability: Some(reliability),
            vigilance_history: history_size,
            activation: ActivationMode::Default,
            test_match,
        };
        Ok(Network::restore(
            &config,
            input_size,
            compression_count as u32,
            f1,
            prototypes,
            VigilanceHistory::from_parts(history_size, history_cursor, history),
        ))
    }
}

impl Persist for MapField {
    fn write_to<W: Write>(&self, writer: &mut W) -> Result<()> {
        writer.write_f32::<LittleEndian>(self.learning_fraction)?;
        writer.write_f32::<LittleEndian>(self.vigilance)?;
        write_count(writer, self.node_count())?;
        write_count(writer, self.input_class_count)?;
        write_bool(writer, self.force_vigilance)?;

        write_count(writer, self.class_edges.len())?;
        for rows in &self.class_edges {
            write_count(writer, rows.len())?;
            for edges in rows {
                write_count(writer, edges.len())?;
                for edge in edges {
                    write_count(writer, edge.node)?;
                    writer.write_f32::<LittleEndian>(edge.weight)?;
                }
            }
        }

        write_count(writer, self.node_edges.len())?;
        for per_network in &self.node_edges {
            write_count(writer, per_network.len())?;
            for edges in per_network {
                write_count(writer, edges.len())?;
                for edge in edges {
                    write_count(writer, edge.class)?;
                    writer.write_f32::<LittleEndian>(edge.weight)?;
                }
            }
        }
        Ok(())
    }

    fn read_from<R: Read>(reader: &mut R) -> Result<Self> {
        let mut map = MapField::new(reader.read_f32::<LittleEndian>()?);
        map.vigilance = reader.read_f32::<LittleEndian>()?;
        let node_count = read_count(reader, "node count")?;
        map.input_class_count = read_count(reader, "input class count")?;
        map.force_vigilance = read_bool(reader, "force vigilance")?;

        let networks = read_count(reader, "network count")?;
        for _ in 0..networks {
            let classes = read_count(reader, "class count")?;
            let mut rows = Vec::new();
            for _ in 0..classes {
                let len = read_count(reader, "edge count")?;
                let mut edges = Vec::new();
                for _ in 0..len {
                    let node = read_count(reader, "node id")?;
                    let weight = reader.read_f32::<LittleEndian>()?;
                    edges.push(NodeEdge { node, weight });
                }
                rows.push(edges);
            }
            map.class_edges.push(rows);
        }

        let nodes = read_count(reader, "node table size")?;
        if nodes != node_count {
            return Err(ArtError::Corrupt(format!(
                "node table holds {nodes} nodes, header says {node_count}"
            )));
        }
        for _ in 0..nodes {
            let networks = read_count(reader, "network count")?;
            let mut per_network = Vec::new();
            for _ in 0..networks {
                let len = read_count(reader, "edge count")?;
                let mut edges = Vec::new();
                for _ in 0..len {
                    let class = read_count(reader, "class id")?;
                    let weight = reader.read_f32::<LittleEndian>()?;
                    edges.push(ClassEdge { class, weight });
                }
                per_network.push(edges);
            }
            map.node_edges.push(per_network);
        }

        if !map.is_consistent() {
            return Err(ArtError::Corrupt(
                "class and node edge tables disagree".to_string(),
            ));
        }
        Ok(map)
    }
}
