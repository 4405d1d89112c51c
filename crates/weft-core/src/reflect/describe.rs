use super::{Kind, Record};

/// One field of a record's structured type description.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldDescription {
    pub index: usize,
    pub name: &'static str,
    pub tag: Option<&'static str>,
    pub kind: Kind,
    pub type_name: &'static str,
}

/// Builds the type description of a record, in declaration order.
pub fn describe(record: &dyn Record) -> Vec<FieldDescription> {
    record
        .fields()
        .iter()
        .enumerate()
        .filter_map(|(index, field)| {
            let value = record.field(index)?;
            Some(FieldDescription {
                index,
                name: field.name,
                tag: field.tag,
                kind: value.kind(),
                type_name: value.type_name(),
            })
        })
        .collect()
}
