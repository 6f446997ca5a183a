use admin_model::FieldType;

/// One column of the `types` report.
#[derive(Debug, Clone)]
pub struct TypeRow {
    pub model: String,
    pub column: String,
    pub storage_type: String,
    pub field_type: Option<FieldType>,
}
