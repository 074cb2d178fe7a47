//! # System Interaction Layer
//!
//! Everything that touches OS processes.
//!
//! ## Modules
//!
//! - **`launcher`**: starts a child from a program path and an `ArgumentVector`, wiring
//!   captured streams to pipes and echoing a trace line.
//! - **`capture`**: drains each captured stream on its own task so a chatty child can never
//!   block on a full pipe while the parent waits.
//! - **`coordinator`**: joins the exit wait with every drain and validates the exit code.
//! - **`resolver`**: finds executables through the platform search helper.
//! - **`executor`**: convenience entry points composing the above.
//! - **`echo`**: the serialized, colored console trace line.

pub mod capture;
pub mod coordinator;
mod echo;
pub mod executor;
pub mod launcher;
pub mod resolver;
