// Prompt constants for the analyze feature.
// The template names the exact output shape; llm_client strips fences anyway
// in case the model ignores the formatting instruction.

/// Resume text ceiling before prompt embedding.
pub const RESUME_CHAR_LIMIT: usize = 15_000;
/// Job-description ceiling before prompt embedding.
pub const JD_CHAR_LIMIT: usize = 5_000;

/// System prompt for the analysis call.
pub const ANALYSIS_SYSTEM: &str =
    "You are an expert ATS and Technical Recruiter. \
    Analyze a resume against a job description and produce a structured match report. \
    You MUST respond with valid JSON only. \
    Do NOT include any text outside the JSON object. \
    Do NOT use markdown code fences.";

// The user prompt is assembled from literal segments with the (truncated)
// inputs appended between them. User-supplied text is never scanned for
// placeholders, so a resume containing placeholder-looking strings stays
// literal.

const PROMPT_HEADER: &str = "\
Analyze the following Resume against the Job Description.

Resume Content:
";

const PROMPT_JD_HEADER: &str = "

Job Description:
";

const PROMPT_FOOTER: &str = "

Output a JSON object with this structure:
{
  \"match_score\": \"85%\",
  \"matching_strengths\": [\"strength 1\", \"strength 2\"],
  \"missing_skills\": [\"skill 1\", \"skill 2\"],
  \"improvement_suggestions\": [\"suggestion 1\", \"suggestion 2\"],
  \"cold_email\": \"Subject: ... Body: ...\"
}
Do not include markdown formatting like ```json. Just the raw JSON.";

/// Builds the analysis prompt, truncating both inputs to their ceilings.
pub fn build_analysis_prompt(resume_text: &str, job_description: &str) -> String {
    let resume_text = truncate_chars(resume_text, RESUME_CHAR_LIMIT);
    let job_description = truncate_chars(job_description, JD_CHAR_LIMIT);

    let mut prompt = String::with_capacity(
        PROMPT_HEADER.len()
            + resume_text.len()
            + PROMPT_JD_HEADER.len()
            + job_description.len()
            + PROMPT_FOOTER.len(),
    );
    prompt.push_str(PROMPT_HEADER);
    prompt.push_str(resume_text);
    prompt.push_str(PROMPT_JD_HEADER);
    prompt.push_str(job_description);
    prompt.push_str(PROMPT_FOOTER);
    prompt
}

/// Truncates to at most `max` chars, never splitting inside a code point.
fn truncate_chars(text: &str, max: usize) -> &str {
    match text.char_indices().nth(max) {
        Some((idx, _)) => &text[..idx],
        None => text,
    }
}
