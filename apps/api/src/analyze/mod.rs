// Resume vs job-description analysis — the one interactive feature.
// Multipart upload → PDF text extraction → single LLM call → relayed JSON.
// All LLM calls go through llm_client; no direct provider calls here.

pub mod extract;
pub mod handlers;
pub mod models;
pub mod prompts;

/// Upload cap for the resume file, matching the client-facing contract.
pub const MAX_RESUME_BYTES: usize = 5 * 1024 * 1024;
