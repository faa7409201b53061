//! Append-only string table.
//!
//! Addresses are assigned in first-seen order and never change; the first
//! sighting of a value also appends its definition to the metadata stream.

use indexmap::IndexSet;

use crate::core::meta::{Address, Record};

#[derive(Debug, Default)]
pub struct StringTable
{
    index: IndexSet<String>,
}

impl StringTable
{
    pub fn new() -> Self
    {
        Self::default()
    }

    /// Address of `value`, defining it in `records` on first use.
    pub fn intern(
        &mut self,
        value: &str,
        records: &mut Vec<Record>,
    ) -> Address
    {
        if let Some(i) = self
            .index
            .get_index_of(value)
        {
            return i as Address;
        }

        let (i, _) = self
            .index
            .insert_full(value.to_owned());
        records.push(Record::Define(value.to_owned()));
        i as Address
    }

    pub fn len(&self) -> usize
    {
        self.index
            .len()
    }

    pub fn is_empty(&self) -> bool
    {
        self.index
            .is_empty()
    }

    pub fn get(
        &self,
        address: Address,
    ) -> Option<&str>
    {
        self.index
            .get_index(address as usize)
            .map(String::as_str)
    }
}
