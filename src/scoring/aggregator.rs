//! Period aggregator
//!
//! Combines logged entries into one score per day, week or month.
//!
//! - one entry: its stored score is passed through untouched
//! - several entries on one day: absolute nutrients are summed, the produce
//!   percentage is calorie weighted, then the blend is scored
//! - several days: each day is blended, the day vectors are averaged per
//!   day and the average is scored

use std::collections::BTreeMap;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::calculator::{compute, Grade, ScoreRecord};
use super::period::Period;
use crate::models::{round1, AdjustedNutrition, FoodEntry, MealType, NutrientVector};

/// One entry as shown in an aggregate
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EntryDetail {
    pub id: i64,
    pub name: String,
    pub brand: String,
    pub description: String,
    pub meal_type: MealType,
    pub quantity: f64,
    pub nutrition: AdjustedNutrition,
    pub date: NaiveDate,
}

impl From<&FoodEntry> for EntryDetail {
    fn from(entry: &FoodEntry) -> Self {
        Self {
            id: entry.id,
            name: entry.name.clone(),
            brand: entry.brand.clone().unwrap_or_default(),
            description: entry.description.clone().unwrap_or_default(),
            meal_type: entry.meal_type,
            quantity: entry.quantity,
            nutrition: entry.adjusted_nutrition(),
            date: entry.date,
        }
    }
}

/// Score of a single day inside a week or month
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DayScore {
    pub date: NaiveDate,
    pub score: i32,
    pub simple_score: i32,
    pub grade: Grade,
    pub nutrition: NutrientVector,
}

/// Score for a period
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AggregateResult {
    pub score: i32,
    pub simple_score: i32,
    pub grade: Grade,
    pub entries: Vec<EntryDetail>,
    pub daily_nutrition: NutrientVector,
    /// Newest day first; only present when several days were averaged
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub daily_scores: Option<Vec<DayScore>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub num_days: Option<usize>,
}

impl AggregateResult {
    /// Neutral result for a period with nothing logged
    pub fn empty() -> Self {
        let neutral = ScoreRecord::neutral();
        Self {
            score: neutral.score,
            simple_score: neutral.simple_score,
            grade: neutral.grade,
            entries: Vec::new(),
            daily_nutrition: NutrientVector::zero(),
            daily_scores: Some(Vec::new()),
            num_days: Some(0),
        }
    }

    fn scored(record: &ScoreRecord, entries: Vec<EntryDetail>, daily_nutrition: NutrientVector) -> Self {
        Self {
            score: record.score,
            simple_score: record.simple_score,
            grade: record.grade,
            entries,
            daily_nutrition,
            daily_scores: None,
            num_days: None,
        }
    }
}

/// Score `entries` for the `period` around `anchor`.
///
/// Entries dated outside the period are ignored.
pub fn aggregate(entries: &[FoodEntry], period: Period, anchor: NaiveDate) -> AggregateResult {
    let in_period: Vec<&FoodEntry> = entries
        .iter()
        .filter(|e| period.contains(anchor, e.date))
        .collect();

    if in_period.is_empty() {
        return AggregateResult::empty();
    }

    if period == Period::Day || in_period.iter().all(|e| e.date == anchor) {
        return blend_entries(&in_period);
    }

    average_days(&in_period)
}

/// Score a flat list of entries as one sitting (a meal or a single day)
pub fn blend_entries(entries: &[&FoodEntry]) -> AggregateResult {
    match entries {
        [] => AggregateResult::empty(),
        [entry] => single_entry(entry),
        _ => {
            let daily_nutrition = blend_nutrients(entries);
            let record = compute(&daily_nutrition);
            let details = entries.iter().map(|e| EntryDetail::from(*e)).collect();
            AggregateResult::scored(&record, details, daily_nutrition)
        }
    }
}

/// One entry keeps the score it was stored with
fn single_entry(entry: &FoodEntry) -> AggregateResult {
    let stored = entry.stored_score();
    AggregateResult {
        score: stored.score,
        simple_score: stored.simple_score,
        grade: stored.grade,
        entries: vec![EntryDetail::from(entry)],
        daily_nutrition: entry.adjusted_nutrients(),
        daily_scores: None,
        num_days: None,
    }
}

/// Sum absolute nutrients; weight `fruits_veg_nuts` by each entry's share of
/// total calories (uniform when there are no calories at all).
pub fn blend_nutrients(entries: &[&FoodEntry]) -> NutrientVector {
    let scaled: Vec<NutrientVector> = entries.iter().map(|e| e.adjusted_nutrients()).collect();
    let total_calories = scaled.iter().fold(0.0, |acc, n| acc + n.calories);
    let uniform = 1.0 / scaled.len() as f64;

    scaled
        .iter()
        .map(|n| {
            let weight = if total_calories > 0.0 {
                n.calories / total_calories
            } else {
                uniform
            };
            NutrientVector {
                fruits_veg_nuts: n.fruits_veg_nuts * weight,
                ..*n
            }
        })
        .sum::<NutrientVector>()
        .rounded()
}

/// Blend each date separately, then average the day vectors
fn average_days(entries: &[&FoodEntry]) -> AggregateResult {
    let mut by_date: BTreeMap<NaiveDate, Vec<&FoodEntry>> = BTreeMap::new();
    for entry in entries {
        by_date.entry(entry.date).or_default().push(*entry);
    }

    let daily_scores: Vec<DayScore> = by_date
        .iter()
        .rev()
        .map(|(date, day_entries)| {
            let day = blend_entries(day_entries);
            DayScore {
                date: *date,
                score: day.score,
                simple_score: day.simple_score,
                grade: day.grade,
                nutrition: day.daily_nutrition,
            }
        })
        .collect();

    let num_days = daily_scores.len();
    // Per-day average. The percentage field was already calorie weighted
    // within each day, so here it is a plain mean like everything else.
    let days = num_days as f64;
    let daily_nutrition = daily_scores
        .iter()
        .map(|d| d.nutrition)
        .sum::<NutrientVector>()
        .map(|total| round1(total / days));

    let record = compute(&daily_nutrition);
    tracing::debug!(
        "Averaged {} days into score {} ({})",
        num_days,
        record.score,
        record.grade
    );

    AggregateResult {
        daily_scores: Some(daily_scores),
        num_days: Some(num_days),
        ..AggregateResult::scored(
            &record,
            entries.iter().map(|e| EntryDetail::from(*e)).collect(),
            daily_nutrition,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::DATE_FORMAT;
    use crate::scoring::ScoreSummary;

    fn date(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, DATE_FORMAT).unwrap()
    }

    fn entry(id: i64, on: &str, quantity: f64, nutrients: NutrientVector) -> FoodEntry {
        let stored = compute(&nutrients).summary();
        FoodEntry {
            id,
            user_id: 1,
            name: format!("food {}", id),
            brand: None,
            description: None,
            meal_type: MealType::Snack,
            date: date(on),
            quantity,
            nutrients,
            grade: Some(stored.grade),
            numeric_score: Some(stored.score),
            simple_score: Some(stored.simple_score),
            created_at: String::new(),
        }
    }

    fn kcal_fvn(calories: f64, fruits_veg_nuts: f64) -> NutrientVector {
        NutrientVector {
            calories,
            fruits_veg_nuts,
            ..Default::default()
        }
    }

    #[test]
    fn test_empty_for_every_period() {
        let anchor = date("2025-03-12");
        for period in [Period::Day, Period::Week, Period::Month] {
            let result = aggregate(&[], period, anchor);
            assert_eq!(result.score, 0);
            assert_eq!(result.simple_score, 50);
            assert_eq!(result.grade, Grade::C);
            assert_eq!(result.num_days, Some(0));
            assert!(result.entries.is_empty());
            assert_eq!(result.daily_nutrition, NutrientVector::zero());
        }
    }

    #[test]
    fn test_single_entry_passes_stored_score_through() {
        let mut e = entry(1, "2025-03-12", 250.0, NutrientVector {
            calories: 120.0,
            energy_kj: 502.0,
            sugars: 3.0,
            ..Default::default()
        });
        // Stored values deliberately disagree with what the nutrients give
        e.grade = Some(Grade::E);
        e.numeric_score = Some(25);
        e.simple_score = Some(9);

        let result = aggregate(&[e.clone()], Period::Day, date("2025-03-12"));
        assert_eq!(result.score, 25);
        assert_eq!(result.simple_score, 9);
        assert_eq!(result.grade, Grade::E);
        assert_eq!(result.daily_nutrition, e.adjusted_nutrients());
        assert_eq!(result.daily_nutrition.calories, 300.0);
        assert_eq!(result.entries.len(), 1);
        assert_eq!(result.entries[0].nutrition.grade, Grade::E);
        assert_eq!(result.daily_scores, None);
        assert_eq!(result.num_days, None);
    }

    #[test]
    fn test_single_entry_without_stored_score_is_neutral() {
        let mut e = entry(1, "2025-03-12", 100.0, kcal_fvn(50.0, 0.0));
        e.grade = None;
        e.numeric_score = None;
        e.simple_score = None;
        let result = blend_entries(&[&e]);
        assert_eq!(
            ScoreSummary { grade: result.grade, score: result.score, simple_score: result.simple_score },
            ScoreSummary::default()
        );
    }

    #[test]
    fn test_equal_calories_average_produce_evenly() {
        let a = entry(1, "2025-03-12", 100.0, kcal_fvn(200.0, 20.0));
        let b = entry(2, "2025-03-12", 100.0, kcal_fvn(200.0, 60.0));
        let blended = blend_nutrients(&[&a, &b]);
        assert_eq!(blended.fruits_veg_nuts, 40.0);
        assert_eq!(blended.calories, 400.0);
    }

    #[test]
    fn test_produce_weighted_by_calorie_share() {
        let a = entry(1, "2025-03-12", 100.0, kcal_fvn(300.0, 100.0));
        let b = entry(2, "2025-03-12", 100.0, kcal_fvn(100.0, 0.0));
        assert_eq!(blend_nutrients(&[&a, &b]).fruits_veg_nuts, 75.0);
    }

    #[test]
    fn test_zero_calories_use_uniform_weights() {
        let a = entry(1, "2025-03-12", 100.0, kcal_fvn(0.0, 30.0));
        let b = entry(2, "2025-03-12", 100.0, kcal_fvn(0.0, 50.0));
        let blended = blend_nutrients(&[&a, &b]);
        assert_eq!(blended.fruits_veg_nuts, 40.0);
        assert!(blended.first_non_finite().is_none());
    }

    #[test]
    fn test_blend_sums_absolute_nutrients_after_scaling() {
        let a = entry(1, "2025-03-12", 50.0, NutrientVector {
            calories: 400.0,
            energy_kj: 1674.0,
            sugars: 30.0,
            sodium: 500.0,
            ..Default::default()
        });
        let b = entry(2, "2025-03-12", 200.0, NutrientVector {
            calories: 50.0,
            energy_kj: 209.0,
            fiber: 2.5,
            protein: 1.5,
            ..Default::default()
        });
        let result = blend_entries(&[&a, &b]);
        let n = result.daily_nutrition;
        assert_eq!(n.calories, 300.0);
        assert_eq!(n.energy_kj, 1255.0);
        assert_eq!(n.sugars, 15.0);
        assert_eq!(n.sodium, 250.0);
        assert_eq!(n.fiber, 5.0);
        assert_eq!(n.protein, 3.0);

        let expected = compute(&n);
        assert_eq!(result.score, expected.score);
        assert_eq!(result.grade, expected.grade);
        assert_eq!(result.entries.len(), 2);
    }

    #[test]
    fn test_week_on_anchor_only_matches_same_day_blend() {
        let anchor = date("2025-03-12");
        let entries = vec![
            entry(1, "2025-03-12", 100.0, kcal_fvn(250.0, 10.0)),
            entry(2, "2025-03-12", 150.0, kcal_fvn(90.0, 70.0)),
        ];
        let refs: Vec<&FoodEntry> = entries.iter().collect();
        let blended = blend_entries(&refs);
        assert_eq!(aggregate(&entries, Period::Week, anchor), blended);
        assert_eq!(aggregate(&entries, Period::Month, anchor), blended);
    }

    #[test]
    fn test_week_averages_days() {
        let anchor = date("2025-03-12");
        let entries = vec![
            entry(2, "2025-03-12", 200.0, NutrientVector {
                calories: 100.0,
                energy_kj: 400.0,
                protein: 2.0,
                fruits_veg_nuts: 20.0,
                ..Default::default()
            }),
            entry(3, "2025-03-12", 100.0, NutrientVector {
                calories: 200.0,
                energy_kj: 800.0,
                fruits_veg_nuts: 80.0,
                ..Default::default()
            }),
            entry(1, "2025-03-10", 100.0, NutrientVector {
                calories: 200.0,
                energy_kj: 800.0,
                protein: 10.0,
                fruits_veg_nuts: 10.0,
                ..Default::default()
            }),
        ];

        let result = aggregate(&entries, Period::Week, anchor);
        assert_eq!(result.num_days, Some(2));
        let days = result.daily_scores.clone().unwrap();
        assert_eq!(days[0].date, date("2025-03-12"));
        assert_eq!(days[1].date, date("2025-03-10"));

        // Wednesday: 400 kcal, 1600 kJ, protein 4, produce 50 (even weights)
        assert_eq!(days[0].nutrition.calories, 400.0);
        assert_eq!(days[0].nutrition.fruits_veg_nuts, 50.0);
        assert_eq!(days[0].score, 1);
        assert_eq!(days[0].grade, Grade::B);
        // Monday has one entry and keeps its stored score
        assert_eq!(days[1].score, entries[2].stored_score().score);

        // Produce is a plain mean of day values, not calorie weighted
        let avg = result.daily_nutrition;
        assert_eq!(avg.calories, 300.0);
        assert_eq!(avg.energy_kj, 1200.0);
        assert_eq!(avg.protein, 7.0);
        assert_eq!(avg.fruits_veg_nuts, 30.0);

        assert_eq!(result.score, -1);
        assert_eq!(result.grade, Grade::A);
        assert_eq!(result.simple_score, 75);
        assert_eq!(result.entries.len(), 3);
    }

    #[test]
    fn test_entries_outside_period_are_ignored() {
        let anchor = date("2025-03-12");
        let entries = vec![
            entry(1, "2025-03-12", 100.0, kcal_fvn(100.0, 0.0)),
            // Sunday of the previous week
            entry(2, "2025-03-09", 100.0, kcal_fvn(900.0, 0.0)),
            // after the anchor
            entry(3, "2025-03-13", 100.0, kcal_fvn(900.0, 0.0)),
        ];
        let result = aggregate(&entries, Period::Week, anchor);
        assert_eq!(result.entries.len(), 1);
        assert_eq!(result.daily_nutrition.calories, 100.0);

        let day = aggregate(&entries, Period::Day, date("2025-03-09"));
        assert_eq!(day.daily_nutrition.calories, 900.0);
    }

    #[test]
    fn test_month_spans_calendar_month() {
        let anchor = date("2025-03-12");
        let entries = vec![
            entry(1, "2025-03-12", 100.0, kcal_fvn(100.0, 0.0)),
            entry(2, "2025-03-01", 100.0, kcal_fvn(300.0, 0.0)),
            entry(3, "2025-02-28", 100.0, kcal_fvn(900.0, 0.0)),
        ];
        let result = aggregate(&entries, Period::Month, anchor);
        assert_eq!(result.num_days, Some(2));
        assert_eq!(result.daily_nutrition.calories, 200.0);
    }

    #[test]
    fn test_serialized_shape() {
        let anchor = date("2025-03-12");
        let entries = vec![
            entry(1, "2025-03-12", 100.0, kcal_fvn(100.0, 0.0)),
            entry(2, "2025-03-11", 100.0, kcal_fvn(300.0, 0.0)),
        ];

        let day = serde_json::to_value(aggregate(&entries, Period::Day, anchor)).unwrap();
        assert!(day.get("daily_scores").is_none());
        assert!(day.get("num_days").is_none());
        assert_eq!(day["entries"][0]["date"], "2025-03-12");
        assert_eq!(day["entries"][0]["brand"], "");

        let week = serde_json::to_value(aggregate(&entries, Period::Week, anchor)).unwrap();
        assert_eq!(week["num_days"], 2);
        assert_eq!(week["daily_scores"][0]["date"], "2025-03-12");
        assert!(week["daily_nutrition"].get("fruits_veg_nuts").is_some());
    }
}
