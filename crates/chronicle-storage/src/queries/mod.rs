pub mod audit_ops;
pub mod entity_ops;
pub mod filter_sql;
