//! Corpus fixtures shared by integration tests.

use gatekeeper::corpus::Corpus;

pub const BATTERY_QUESTION: &str = "How to replace the Nook HD battery?";
pub const BATTERY_ANSWER: &str = "Pry off the back cover, disconnect the battery flex cable, then lift the cell out.";

pub const KEYBOARD_QUESTION: &str = "How to replace the keyboard on an HP dv5-1125nr?";
pub const KEYBOARD_ANSWER: &str = "Remove the keyboard retention screws from the bottom case and release the top latches.";

pub const SPEAKER_QUESTION: &str = "How to replace the speakers on a Toshiba Satellite A105?";
pub const SPEAKER_ANSWER: &str = "Take off the palmrest, unplug the speaker connector and unscrew both speaker brackets.";

pub const GPU_QUESTION: &str = "How to reseat an NVIDIA H100 SXM module?";
pub const GPU_ANSWER: &str = "Power down the node, remove the heatsink and lift the module straight up.";

pub fn qa_pairs() -> Vec<(&'static str, &'static str)> {
    vec![
        (BATTERY_QUESTION, BATTERY_ANSWER),
        (KEYBOARD_QUESTION, KEYBOARD_ANSWER),
        (SPEAKER_QUESTION, SPEAKER_ANSWER),
        (GPU_QUESTION, GPU_ANSWER),
    ]
}

pub fn repair_corpus() -> Corpus {
    Corpus::from_pairs(qa_pairs())
}

/// The same records in the on-disk JSON format.
pub fn repair_corpus_json() -> String {
    let records: Vec<serde_json::Value> = qa_pairs()
        .into_iter()
        .map(|(q, a)| serde_json::json!({ "instruction": q, "input": "", "output": a }))
        .collect();
    serde_json::Value::Array(records).to_string()
}
