//! Splits a run of messages into fixed-size chunks without separating a
//! user message from the assistant reply immediately following it.

use crate::messages::{Message, Role};

/// Groups `messages` into chunks of `chunk_size`, extending a chunk by one
/// extra message when cutting at exactly `chunk_size` would split a
/// user/assistant pair.
pub fn chunk_messages(messages: &[Message], chunk_size: usize) -> Vec<Vec<Message>> {
    if chunk_size == 0 || messages.is_empty() {
        return vec![];
    }

    let mut chunks = Vec::new();
    let mut current: Vec<Message> = Vec::new();
    let mut i = 0;

    while i < messages.len() {
        current.push(messages[i].clone());

        if current.len() >= chunk_size {
            let splits_pair = messages[i].role == Role::User
                && messages
                    .get(i + 1)
                    .map(|m| m.role == Role::Assistant)
                    .unwrap_or(false);
            if splits_pair {
                i += 1;
                current.push(messages[i].clone());
            }
            chunks.push(std::mem::take(&mut current));
        }
        i += 1;
    }

    if !current.is_empty() {
        chunks.push(current);
    }

    chunks
}
