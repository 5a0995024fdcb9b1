// Per-file pipeline: locate -> decode -> assemble

use crate::core::assembler::{assemble, patient_metadata, DecodedChannels, ExtractionRecord};
use crate::core::decoder::decode_channel;
use crate::core::error::Issue;
use crate::core::format::DataSet;
use crate::core::locator::locate;
use tracing::warn;

#[derive(Debug)]
pub struct Extraction {
    pub record: ExtractionRecord,
    /// Non-fatal conditions, in the order they were met.
    pub issues: Vec<Issue>,
}

pub fn extract(tree: &DataSet) -> Extraction {
    let located = locate(tree);
    let mut issues = located.issues;

    let mut decoded = DecodedChannels::new();
    for group in &located.groups {
        for channel in 0..group.channels.len() {
            match decode_channel(group, channel) {
                Ok(values) => {
                    decoded.insert((group.index, channel), values);
                }
                Err(e) => {
                    warn!("group {} channel {} skipped: {}", group.index, channel, e);
                    issues.push(Issue::channel(group.index, channel, e));
                }
            }
        }
    }

    let metadata = patient_metadata(tree, located.groups.first());
    let (record, condition) = assemble(&located.groups, decoded, metadata);
    issues.extend(condition);

    Extraction { record, issues }
}
