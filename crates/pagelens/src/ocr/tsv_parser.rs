//! Tesseract TSV output parsing.

use super::types::{OcrLine, OcrToken};

/// Row level of a single word in Tesseract TSV output.
pub const TSV_WORD_LEVEL: u32 = 5;
pub const TSV_MIN_FIELDS: usize = 12;

/// One word row of Tesseract TSV output.
#[derive(Debug, Clone, PartialEq)]
pub struct TsvWord {
    pub block_num: u32,
    pub par_num: u32,
    pub line_num: u32,
    pub left: u32,
    pub top: u32,
    pub width: u32,
    pub height: u32,
    pub confidence: f64,
    pub text: String,
}

impl TsvWord {
    fn line_key(&self) -> (u32, u32, u32) {
        (self.block_num, self.par_num, self.line_num)
    }
}

/// Extract word rows from TSV output.
///
/// Skips the header, non-word rows, rows with blank text and rows whose
/// confidence is below `min_confidence` (Tesseract reports `-1` for non-text).
pub fn parse_tsv_words(tsv_data: &str, min_confidence: f64) -> Vec<TsvWord> {
    let mut words = Vec::new();

    for (line_num, line) in tsv_data.lines().enumerate() {
        if line_num == 0 {
            continue;
        }

        let fields: Vec<&str> = line.split('\t').collect();
        if fields.len() < TSV_MIN_FIELDS {
            continue;
        }

        let level = fields[0].trim().parse::<u32>().unwrap_or(0);
        if level != TSV_WORD_LEVEL {
            continue;
        }

        let confidence = fields[10].trim().parse::<f64>().unwrap_or(-1.0);
        if confidence < min_confidence {
            continue;
        }

        let text = fields[11].trim();
        if text.is_empty() {
            continue;
        }

        words.push(TsvWord {
            block_num: fields[2].trim().parse().unwrap_or(0),
            par_num: fields[3].trim().parse().unwrap_or(0),
            line_num: fields[4].trim().parse().unwrap_or(0),
            left: fields[6].trim().parse().unwrap_or(0),
            top: fields[7].trim().parse().unwrap_or(0),
            width: fields[8].trim().parse().unwrap_or(0),
            height: fields[9].trim().parse().unwrap_or(0),
            confidence,
            text: text.to_string(),
        });
    }

    words
}

/// Group consecutive words sharing (block, paragraph, line) into OCR lines.
pub fn lines_from_words(words: Vec<TsvWord>) -> Vec<OcrLine> {
    let mut lines: Vec<OcrLine> = Vec::new();
    let mut current_key = None;

    for word in words {
        let key = word.line_key();
        let token = OcrToken::from_rect(
            word.left as f64,
            word.top as f64,
            word.width as f64,
            word.height as f64,
            word.text,
            word.confidence,
        );

        match lines.last_mut() {
            Some(line) if current_key == Some(key) => line.push(token),
            _ => lines.push(vec![token]),
        }
        current_key = Some(key);
    }

    lines
}
