//! Fixed-width little-endian record files.
//!
//! Itemset record, 20 bytes:
//!
//! | offset | size | field                          |
//! |--------|------|--------------------------------|
//! | 0      | 4    | item count (`i32`)             |
//! | 4      | 4    | support (`i32`)                |
//! | 8      | 10   | item symbols, `0`-padded       |
//! | 18     | 2    | padding                        |
//!
//! Rule record, 28 bytes: 10 antecedent symbols, 10 consequent symbols,
//! support (`f32`), confidence (`f32`).
//!
//! A corpus file is a bare array of itemset records. Cumulative and rule files
//! start with an `i32` record count.

use std::fs::File;
use std::io::{BufReader, BufWriter, Cursor, ErrorKind, Read, Write};
use std::path::Path;

use byteorder::{LittleEndian, ReadBytesExt, WriteBytesExt};

use crate::error::{MiningError, Result};
use crate::itemset::Itemset;
use crate::rules::RuleSet;
use crate::types::{FrequentItemsets, Item, SupportCount, Transaction, MAX_ITEMSET_LEN};

pub const ITEMSET_RECORD_LEN: usize = 20;
pub const RULE_RECORD_LEN: usize = 28;
const ITEMSET_PADDING: usize = 2;

const CORPUS: &str = "corpus";
const MERGED: &str = "cumulative itemset";
const RULES: &str = "rule";

/// A rule as stored on disk.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RuleRecord {
    pub antecedent: Itemset,
    pub consequent: Itemset,
    pub support: f32,
    pub confidence: f32,
}

fn parse_error(file: &'static str, record: usize, reason: impl Into<String>) -> MiningError {
    MiningError::Parse {
        file,
        record,
        reason: reason.into(),
    }
}

fn truncated(file: &'static str, record: usize) -> impl FnOnce(std::io::Error) -> MiningError {
    move |e| {
        if e.kind() == ErrorKind::UnexpectedEof {
            parse_error(file, record, "truncated record")
        } else {
            MiningError::Io(e)
        }
    }
}

fn read_symbols(symbols: &[u8], len: usize, file: &'static str, record: usize) -> Result<Itemset> {
    let mut itemset = Itemset::new();
    for &item in &symbols[..len] {
        if item == 0 {
            return Err(parse_error(file, record, "padding symbol inside item list"));
        }
        itemset
            .insert_sorted(item)
            .map_err(|_| parse_error(file, record, "too many items"))?;
    }
    if itemset.len() != len {
        return Err(parse_error(file, record, "duplicate item"));
    }
    Ok(itemset)
}

fn symbols_of(itemset: &Itemset) -> [Item; MAX_ITEMSET_LEN] {
    let mut symbols = [0; MAX_ITEMSET_LEN];
    symbols[..itemset.len()].copy_from_slice(itemset.items());
    symbols
}

pub fn read_itemset_record<R: Read>(reader: &mut R, file: &'static str, record: usize) -> Result<Itemset> {
    let len = reader.read_i32::<LittleEndian>().map_err(truncated(file, record))?;
    let support = reader.read_i32::<LittleEndian>().map_err(truncated(file, record))?;
    let mut symbols = [0u8; MAX_ITEMSET_LEN + ITEMSET_PADDING];
    reader.read_exact(&mut symbols).map_err(truncated(file, record))?;

    if len < 0 || len as usize > MAX_ITEMSET_LEN {
        return Err(parse_error(file, record, format!("item count {} out of range", len)));
    }
    if support < 0 {
        return Err(parse_error(file, record, format!("negative support {}", support)));
    }
    let itemset = read_symbols(&symbols, len as usize, file, record)?;
    Ok(itemset.with_support(support as SupportCount))
}

pub fn write_itemset_record<W: Write>(writer: &mut W, itemset: &Itemset) -> Result<()> {
    writer.write_i32::<LittleEndian>(itemset.len() as i32)?;
    writer.write_i32::<LittleEndian>(itemset.support() as i32)?;
    writer.write_all(&symbols_of(itemset))?;
    writer.write_all(&[0; ITEMSET_PADDING])?;
    Ok(())
}

pub fn read_corpus<R: Read>(reader: &mut R) -> Result<Vec<Transaction>> {
    let mut bytes = Vec::new();
    reader.read_to_end(&mut bytes)?;
    if bytes.len() % ITEMSET_RECORD_LEN != 0 {
        return Err(parse_error(
            CORPUS,
            bytes.len() / ITEMSET_RECORD_LEN,
            format!("{} trailing bytes", bytes.len() % ITEMSET_RECORD_LEN),
        ));
    }

    let mut cursor = Cursor::new(bytes.as_slice());
    (0..bytes.len() / ITEMSET_RECORD_LEN)
        .map(|record| read_itemset_record(&mut cursor, CORPUS, record).map(|t| t.with_support(0)))
        .collect()
}

pub fn write_corpus<W: Write>(writer: &mut W, transactions: &[Transaction]) -> Result<()> {
    for transaction in transactions {
        write_itemset_record(writer, &transaction.with_support(0))?;
    }
    Ok(())
}

fn read_count<R: Read>(reader: &mut R, file: &'static str, capacity: usize) -> Result<usize> {
    let count = reader.read_i32::<LittleEndian>().map_err(truncated(file, 0))?;
    if count < 0 || count as usize > capacity {
        return Err(parse_error(
            file,
            0,
            format!("record count {} outside 0..={}", count, capacity),
        ));
    }
    Ok(count as usize)
}

/// Read a cumulative itemset file. Records past the stored count are ignored.
pub fn read_merged<R: Read>(reader: &mut R, capacity: usize) -> Result<FrequentItemsets> {
    let count = read_count(reader, MERGED, capacity)?;
    let mut frequent = FrequentItemsets::with_capacity(capacity);
    for record in 0..count {
        let itemset = read_itemset_record(reader, MERGED, record)?;
        if itemset.is_empty() {
            return Err(parse_error(MERGED, record, "empty itemset"));
        }
        frequent.insert(itemset)?;
    }
    Ok(frequent)
}

pub fn write_merged<W: Write>(writer: &mut W, frequent: &FrequentItemsets) -> Result<()> {
    writer.write_i32::<LittleEndian>(frequent.len() as i32)?;
    for itemset in frequent.iter() {
        write_itemset_record(writer, itemset)?;
    }
    Ok(())
}

pub fn write_rules<W: Write>(writer: &mut W, rules: &RuleSet) -> Result<()> {
    writer.write_i32::<LittleEndian>(rules.len() as i32)?;
    for rule in rules.iter() {
        writer.write_all(&symbols_of(&rule.antecedent))?;
        writer.write_all(&symbols_of(&rule.consequent))?;
        writer.write_f32::<LittleEndian>(rule.support)?;
        writer.write_f32::<LittleEndian>(rule.confidence)?;
    }
    Ok(())
}

pub fn read_rules<R: Read>(reader: &mut R, capacity: usize) -> Result<Vec<RuleRecord>> {
    let count = read_count(reader, RULES, capacity)?;
    let mut rules = Vec::with_capacity(count);
    for record in 0..count {
        let mut antecedent = [0u8; MAX_ITEMSET_LEN];
        let mut consequent = [0u8; MAX_ITEMSET_LEN];
        reader.read_exact(&mut antecedent).map_err(truncated(RULES, record))?;
        reader.read_exact(&mut consequent).map_err(truncated(RULES, record))?;
        let support = reader.read_f32::<LittleEndian>().map_err(truncated(RULES, record))?;
        let confidence = reader.read_f32::<LittleEndian>().map_err(truncated(RULES, record))?;

        rules.push(RuleRecord {
            antecedent: read_symbols(&antecedent, symbol_len(&antecedent), RULES, record)?,
            consequent: read_symbols(&consequent, symbol_len(&consequent), RULES, record)?,
            support,
            confidence,
        });
    }
    Ok(rules)
}

fn symbol_len(symbols: &[u8]) -> usize {
    symbols.iter().position(|&s| s == 0).unwrap_or(symbols.len())
}

pub fn load_corpus(path: &Path) -> Result<Vec<Transaction>> {
    read_corpus(&mut BufReader::new(File::open(path)?))
}

pub fn load_merged(path: &Path, capacity: usize) -> Result<FrequentItemsets> {
    read_merged(&mut BufReader::new(File::open(path)?), capacity)
}

pub fn save_merged(path: &Path, frequent: &FrequentItemsets) -> Result<()> {
    let mut writer = BufWriter::new(File::create(path)?);
    write_merged(&mut writer, frequent)?;
    writer.flush()?;
    Ok(())
}

pub fn save_rules(path: &Path, rules: &RuleSet) -> Result<()> {
    let mut writer = BufWriter::new(File::create(path)?);
    write_rules(&mut writer, rules)?;
    writer.flush()?;
    Ok(())
}

pub fn load_rules(path: &Path, capacity: usize) -> Result<Vec<RuleRecord>> {
    read_rules(&mut BufReader::new(File::open(path)?), capacity)
}
