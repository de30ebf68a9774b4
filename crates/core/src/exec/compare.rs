use super::command::AggregateQuery;
use super::store::Coordinates;
use super::units::{number, unit};
use std::cmp::Ordering;

/// How `left` relates to `right`. Exact equality; no tolerance.
pub fn relation(left: f64, right: f64) -> &'static str {
    match left.partial_cmp(&right) {
        Some(Ordering::Equal) => "equal to",
        Some(Ordering::Greater) => "greater than",
        _ => "less than",
    }
}

/// Sentence comparing a local aggregate with the archive at a location.
pub fn external_sentence(
    query: &AggregateQuery,
    local: f64,
    at: Coordinates,
    external: f64,
) -> String {
    let long = query.kind.long_name();
    let row = &query.row;
    let unit = unit(row);
    format!(
        "In the given data the {long} of {row} in the dataset was {}{unit} which was {}, at latitude {} and longitude {} the {long} of {row} was {}{unit}",
        number(local),
        relation(local, external),
        number(at.latitude),
        number(at.longitude),
        number(external),
    )
}

/// Sentence comparing two local aggregates.
pub fn dataset_sentence(
    first: &AggregateQuery,
    first_value: f64,
    second: &AggregateQuery,
    second_value: f64,
) -> String {
    format!(
        "In the first given query the {} of {} in the dataset was {}{} which was {} the second query, the {} of {} was {}{}",
        first.kind.long_name(),
        first.row,
        number(first_value),
        unit(&first.row),
        relation(first_value, second_value),
        second.kind.long_name(),
        second.row,
        number(second_value),
        unit(&second.row),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use weather_query_dataset::Aggregate;

    fn query(kind: Aggregate, row: &str) -> AggregateQuery {
        AggregateQuery {
            kind,
            row: row.to_string(),
            start: None,
            end: None,
        }
    }

    #[test]
    fn relation_is_exact() {
        assert_eq!(relation(1.0, 1.0), "equal to");
        assert_eq!(relation(1.0 + f64::EPSILON, 1.0), "greater than");
        assert_eq!(relation(0.5, 1.0), "less than");
    }

    #[test]
    fn external_sentence_reads_naturally() {
        let s = external_sentence(
            &query(Aggregate::Max, "temperature_max"),
            75.0,
            Coordinates {
                latitude: 38.9,
                longitude: -94.7,
            },
            80.5,
        );
        assert_eq!(
            s,
            "In the given data the maximum of temperature_max in the dataset was 75° which was less than, at latitude 38.9 and longitude -94.7 the maximum of temperature_max was 80.5°"
        );
    }

    #[test]
    fn dataset_sentence_uses_each_side() {
        let s = dataset_sentence(
            &query(Aggregate::Min, "temperature_max"),
            70.0,
            &query(Aggregate::Avg, "precipitation_sum"),
            0.25,
        );
        assert_eq!(
            s,
            "In the first given query the minimum of temperature_max in the dataset was 70° which was greater than the second query, the average of precipitation_sum was 0.25in"
        );
    }
}
