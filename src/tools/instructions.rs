//! Usage guide returned by the scoring_instructions tool

pub const SCORING_INSTRUCTIONS: &str = r#"
# Nutrition Scoring Instructions

Every food is scored per 100g on a Nutri-Score style scale. Lower raw scores
are better.

| Grade | Raw score | Meaning              |
|-------|-----------|----------------------|
| A     | -15 to -1 | Excellent            |
| B     | 0 to 2    | Good                 |
| C     | 3 to 10   | Average              |
| D     | 11 to 18  | Poor                 |
| E     | 19 to 40  | Avoid where possible |

`simple_score` maps the raw score onto 0-100 where higher is better
(-15 → 100, 40 → 0).

---

## Logging a food

**Tool:** `log_food`

Nutrients are taken from the first source available:

1. `reference_id` - a known food from `list_food_references`
2. `nutrients` - per-100g values you supply:
   `calories, energy_kj, protein, carbs, sugars, fat, saturated_fat,
   sodium (mg), fiber, fruits_veg_nuts (%)`. If a similar food already
   exists its stored values are reused.
3. A similar food already in the reference database (matched by name, and
   by brand when given)
4. `nutrition_reply` - a plain reply listing nine per-100g numbers in this
   order: `calories, energy_kj, sugars, saturated_fat, fat, sodium, fiber,
   protein, fruits_veg_nuts`

If none of these applies the call fails with
"Failed to get nutrition information". Look the food up and retry with
`nutrients` or `nutrition_reply`.

Other fields:
- `quantity` - grams eaten (default 100)
- `meal_type` - breakfast, lunch, dinner, snack or tea (default snack)
- `date` - YYYY-MM-DD (default today)

**Tip:** `parse_nutrition_reply` shows how a reply will be read before you
log with it.

---

## Scores

- `daily_score` - one day. A single food keeps its own score; several foods
  are scored on their combined nutrients.
- `weekly_score` - Monday up to the given date
- `monthly_score` - the whole calendar month of the given date

Week and month scores average each day's combined nutrients, then score the
average day. `daily_scores` lists each day, newest first. With no foods
logged every score is neutral: grade C, score 0, simple_score 50.

`score_nutrients` scores any per-100g values without logging them.
"#;
