/// Prompt for answering a question about a note.
pub fn answer_with_context(question: &str, context: &str) -> String {
    format!(
        "Context:\n{}\n\nQuestion: {}\n\nAnswer the question based on the context above. \
         If the answer is not in the context, say so but try to be helpful based on general \
         knowledge if appropriate.",
        context, question
    )
}

pub fn transform_with_instruction(text: &str, instruction: &str) -> String {
    format!("{}\n\nContent:\n{}", instruction, text)
}
