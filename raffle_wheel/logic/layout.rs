use crate::history::HistoryEntry;
use crate::pool::Pool;
use crate::rotation::FULL_TURN;
use crate::Degrees;
use serde::Serialize;

pub const PALETTE: [&str; 7] = [
    "#f97316", "#22c55e", "#3b82f6", "#e11d48", "#a855f7", "#eab308", "#14b8a6",
];

const ELLIPSIS: char = '…';

/// One slice of the wheel, as the view must draw it
#[derive(Debug, PartialEq, Clone, Serialize)]
pub struct Wedge {
    pub label: String,
    pub start_angle: Degrees,
    pub end_angle: Degrees,
    pub color: &'static str,
}

pub fn wheel_layout(pool: &Pool, label_max_chars: usize) -> Vec<Wedge> {
    if pool.is_empty() {
        return Vec::new();
    }
    let wedge = FULL_TURN / pool.len() as Degrees;
    pool.iter()
        .enumerate()
        .map(|(i, entry)| Wedge {
            label: truncate_label(entry, label_max_chars),
            start_angle: i as Degrees * wedge,
            end_angle: (i + 1) as Degrees * wedge,
            color: PALETTE[i % PALETTE.len()],
        })
        .collect()
}

pub fn truncate_label(label: &str, max_chars: usize) -> String {
    match label.char_indices().nth(max_chars) {
        Some((end, _)) => {
            let mut truncated = label[..end].to_string();
            truncated.push(ELLIPSIS);
            truncated
        }
        None => label.to_string(),
    }
}

pub fn history_line(entry: &HistoryEntry) -> String {
    match &entry.prize {
        Some(prize) => format!("{} → {}", entry.participant, prize),
        None => format!("{} → (prize pending)", entry.participant),
    }
}
