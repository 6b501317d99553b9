pub mod lease_accounting;
