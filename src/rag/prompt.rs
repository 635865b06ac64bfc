// Prompt construction in the Mistral instruction format

/// Wrap context and question in the Mistral-Instruct template.
///
/// Neither argument is escaped; template markers inside them pass through.
pub fn build_prompt(context: &str, question: &str) -> String {
    format!(
        "<s>[INST] Using the following context, answer the question as completely and accurately as possible.\n\nContext:\n{}\n\nQuestion:\n{} [/INST]",
        context, question
    )
}
