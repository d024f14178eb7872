// ============================================================
// Layer 3 — Domain Layer
// ============================================================
// Plain Rust types that describe what the pipeline works on:
//
//   error.rs : the pipeline error taxonomy (I/O, schema, encoding)
//   table.rs : an untyped, header-addressed CSV table
//   record.rs: one typed flight observation after cleaning
//   traits.rs: the seams other layers implement
//
// Rules for this layer:
//   - NO Burn framework types allowed here
//   - NO file I/O or network calls
//   - Only plain Rust structs, enums, and traits
//
// Reference: Rust Book §5 (Structs), §10 (Traits)

// Error taxonomy shared by the loader, cleaner and encoder
pub mod error;

// Untyped tabular data straight out of the CSV sources
pub mod table;

// Typed flight observations
pub mod record;

// Core abstractions (traits) that other layers implement
pub mod traits;
