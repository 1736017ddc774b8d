use std::sync::Arc;

use arrow::array::{LargeStringArray, StringArray};
use cubescan::{
    CodeSystem, ColumnRef, ColumnValueRange, CompareFilter, DecodeError, DictCode, Dictionary,
    FilterOperator, Segment, SegmentIdGenerator,
};

fn country() -> ColumnRef {
    ColumnRef::new("table_a", 1, "col_1")
}

fn countries() -> Dictionary {
    let array = StringArray::from(vec![Some("US"), None, Some("CN"), Some("US")]);
    Dictionary::from_array(&array).expect("dictionary")
}

fn tighten(op: FilterOperator, literal: &str, dict: &Dictionary) -> ColumnValueRange {
    let filter = CompareFilter::new(country(), op, [literal]);
    let mut range = ColumnValueRange::from_filter(&filter).expect("range");
    range.pre_evaluate_with_dict(dict);
    range
}

fn text(value: Option<&[u8]>) -> Option<String> {
    value.map(|v| String::from_utf8(v.to_vec()).expect("utf8"))
}

#[test]
fn less_than_rounds_down() {
    let dict = countries();
    assert!(tighten(FilterOperator::Lt, "CN", &dict).satisfies_none());

    let other = tighten(FilterOperator::Lt, "Other", &dict);
    assert!(!other.satisfies_none());
    assert_eq!(other.begin_value(), None);
    assert_eq!(text(other.end_value()).as_deref(), Some("CN"));

    let past_end = tighten(FilterOperator::Lt, "UT", &dict);
    assert_eq!(text(past_end.end_value()).as_deref(), Some("US"));
}

#[test]
fn greater_or_equal_rounds_up() {
    let dict = countries();
    assert!(tighten(FilterOperator::Gte, "UT", &dict).satisfies_none());

    for (literal, begin) in [("CI", "CN"), ("CN", "CN"), ("Other", "US")] {
        let range = tighten(FilterOperator::Gte, literal, &dict);
        assert_eq!(text(range.begin_value()).as_deref(), Some(begin), "{literal}");
        assert_eq!(range.end_value(), None, "{literal}");
    }
}

#[test]
fn equality_keeps_present_values() {
    let dict = countries();
    let filter = CompareFilter::new(country(), FilterOperator::In, ["US", "DE", "CN"]);
    let mut range = ColumnValueRange::from_filter(&filter).expect("range");
    assert_eq!(range.equal_values().map(|v| v.len()), Some(3));
    range.pre_evaluate_with_dict(&dict);
    assert_eq!(
        range.equal_codes(),
        Some(vec![DictCode::Id(0), DictCode::Id(1)])
    );

    assert!(tighten(FilterOperator::Eq, "DE", &dict).satisfies_none());
}

#[test]
fn rounding_never_changes_the_matching_set() {
    let mut rng = fastrand::Rng::with_seed(42);
    let letters = b"ABCD";
    let word = |rng: &mut fastrand::Rng| -> String {
        (0..rng.usize(1..4))
            .map(|_| letters[rng.usize(..letters.len())] as char)
            .collect()
    };
    let ops = [
        FilterOperator::Lt,
        FilterOperator::Lte,
        FilterOperator::Gt,
        FilterOperator::Gte,
        FilterOperator::Eq,
        FilterOperator::NotEq,
    ];
    for _ in 0..50 {
        let values: Vec<String> = (0..rng.usize(1..10)).map(|_| word(&mut rng)).collect();
        let array = LargeStringArray::from_iter_values(values.iter());
        let dict = Dictionary::from_array(&array).expect("dictionary");

        for op in ops {
            let literal = word(&mut rng);
            let range = tighten(op, &literal, &dict);
            for (code, value) in dict.values().enumerate() {
                let value = std::str::from_utf8(value).expect("utf8");
                let matches = match op {
                    FilterOperator::Lt => value < literal.as_str(),
                    FilterOperator::Lte => value <= literal.as_str(),
                    FilterOperator::Gt => value > literal.as_str(),
                    FilterOperator::Gte => value >= literal.as_str(),
                    FilterOperator::Eq => value == literal,
                    _ => value != literal,
                };
                assert_eq!(
                    range.contains_code(DictCode::Id(code as u32)),
                    matches,
                    "{op} {literal} against {value}"
                );
            }
            assert!(!range.contains_code(DictCode::Null));
            let any_match =
                (0..dict.len()).any(|code| range.contains_code(DictCode::Id(code as u32)));
            assert_eq!(range.satisfies_none(), !any_match, "{op} {literal}");
        }
    }
}

#[test]
fn each_segment_tightens_against_its_own_dictionary() {
    let ids = SegmentIdGenerator::new();
    let dict = |values: &[&str]| {
        let mut builder = Dictionary::builder();
        builder.extend(values.iter());
        Arc::new(builder.build().expect("dictionary"))
    };
    let segments = [
        Segment::new(ids.generate(), "a").with_dictionary(country(), dict(&["AR", "BR"])),
        Segment::new(ids.generate(), "b").with_dictionary(country(), dict(&["CN", "US"])),
        Segment::new(ids.generate(), "c").with_dictionary(country(), dict(&["DE", "FR", "US"])),
    ];
    let range = ColumnValueRange::new(country(), FilterOperator::Gt, ["CN"]).expect("range");

    let begins: Vec<Option<String>> = segments
        .iter()
        .map(|segment| segment.pre_evaluate(&range))
        .map(|tightened| text(tightened.begin_value()))
        .collect();
    assert_eq!(
        begins,
        vec![None, Some("US".to_string()), Some("DE".to_string())]
    );
    assert!(segments[0].pre_evaluate(&range).satisfies_none());
}

#[test]
fn coded_constants_serialize_with_their_width() {
    let dict = countries();
    let range = tighten(FilterOperator::Gte, "CI", &dict);
    let codes = dict.code_system();

    let mut wire: Vec<u8> = Vec::new();
    let begin = range.begin_code().expect("begin");
    codes.serialize(begin, &mut wire).expect("serialize");
    codes.serialize(DictCode::Null, &mut wire).expect("serialize");
    assert_eq!(wire, vec![0, 1, 0, 0, 1, 0xFF]);

    let mut buf = &wire[..];
    assert_eq!(codes.deserialize(&mut buf), Ok(begin));
    assert_eq!(codes.deserialize(&mut buf), Ok(DictCode::Null));
    assert_eq!(
        codes.deserialize(&mut buf),
        Err(DecodeError::Truncated {
            expected: 2,
            actual: 0
        })
    );

    // A wider all-null payload still reads as null.
    let wide = CodeSystem::new(3).expect("width");
    let mut nulls: Vec<u8> = Vec::new();
    wide.serialize(DictCode::Null, &mut nulls).expect("serialize");
    assert_eq!(codes.deserialize(&mut &nulls[..]), Ok(DictCode::Null));
}
