//! Reduction of labeled feature records into per-label pattern summaries.

use docval_model::{
    BooleanFeature, ContentFeatures, FeatureRecord, Label, PatternSummaries, PatternSummary,
    RankedValue,
};
use std::collections::BTreeMap;

fn mean(sum: f64, count: usize) -> f64 {
    if count == 0 {
        0.0
    } else {
        sum / count as f64
    }
}

/// Count values and rank them by frequency; ties keep first-seen order.
fn rank<T: PartialEq>(values: impl IntoIterator<Item = T>) -> Vec<RankedValue<T>> {
    let mut ranked: Vec<RankedValue<T>> = Vec::new();
    for value in values {
        match ranked.iter().position(|r| r.value == value) {
            Some(i) => ranked[i].count += 1,
            None => ranked.push(RankedValue { value, count: 1 }),
        }
    }
    // stable sort keeps first-seen order among equal counts
    ranked.sort_by(|a, b| b.count.cmp(&a.count));
    ranked
}

/// Summarize the records of one label. An empty input gives the zero summary.
pub fn summarize<'a>(records: impl IntoIterator<Item = &'a FeatureRecord>) -> PatternSummary {
    let records: Vec<&FeatureRecord> = records.into_iter().collect();
    if records.is_empty() {
        return PatternSummary::default();
    }

    let mut size_sum = 0.0;
    let mut integrity_sum = 0.0;
    let mut word_sum = 0.0;
    let mut text_count = 0;
    let mut quality_sum = 0.0;
    let mut image_count = 0;
    let mut tallies: BTreeMap<BooleanFeature, (usize, usize)> = BTreeMap::new();

    for record in &records {
        size_sum += record.metadata.size_mb;
        integrity_sum += f64::from(record.integrity_score);

        match &record.content {
            ContentFeatures::Text(text) => {
                word_sum += text.word_count as f64;
                text_count += 1;
            }
            ContentFeatures::Image(image) => {
                quality_sum += f64::from(image.quality);
                image_count += 1;
            }
            ContentFeatures::Pdf(_) => {}
        }

        for (feature, present) in record.boolean_features() {
            let (hits, applicable) = tallies.entry(feature).or_insert((0, 0));
            *applicable += 1;
            if present {
                *hits += 1;
            }
        }
    }

    let feature_rates = tallies
        .into_iter()
        .map(|(feature, (hits, applicable))| (feature, mean(hits as f64, applicable) as f32))
        .collect();

    PatternSummary {
        sample_count: records.len(),
        mean_size_mb: mean(size_sum, records.len()),
        extensions: rank(records.iter().filter_map(|r| r.metadata.extension.clone())),
        size_categories: rank(records.iter().map(|r| r.metadata.size_category)),
        feature_rates,
        mean_word_count: mean(word_sum, text_count),
        mean_quality: mean(quality_sum, image_count) as f32,
        mean_integrity: mean(integrity_sum, records.len()) as f32,
    }
}

/// Summarize a labeled sequence into one summary per label.
pub fn aggregate(examples: &[(FeatureRecord, Label)]) -> PatternSummaries {
    let of_label = |label: Label| {
        summarize(
            examples
                .iter()
                .filter(move |(_, l)| *l == label)
                .map(|(record, _)| record),
        )
    };

    PatternSummaries {
        valid: of_label(Label::Valid),
        invalid: of_label(Label::Invalid),
    }
}
