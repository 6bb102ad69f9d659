// ============================================================
// Layer 2 - Application / Use Cases
// ============================================================
// This layer wires the other layers together to answer a
// question. It owns the workflow, not the work:
//
//   - No ML math or model code here
//   - No UI or printing here (that's Layer 1)
//   - No direct database/file access (that's Layer 4 and 6)
//
// Reference: Clean Architecture pattern
//            Rust Book §7 (Module System)

// Typed settings for the whole pipeline
pub mod config;

// The question-answering workflow
pub mod ask_use_case;
