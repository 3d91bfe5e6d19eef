use laborgrid::domain::Tag;
use laborgrid::filter::{FilterStore, TagIndex};
use laborgrid::query;

const FACETS: &[&str] = &["area_type", "measure_type", "area", "period"];
const VALUES: &[&str] = &["Statewide", "Unemployment", "Ohio", "2017-01", "A|B", "5% & up"];

/// Small deterministic generator so the sequences are reproducible.
struct Lcg(u64);

impl Lcg {
    fn next(&mut self, bound: usize) -> usize {
        self.0 = self.0.wrapping_mul(6364136223846793005).wrapping_add(1442695040888963407);
        ((self.0 >> 33) as usize) % bound
    }
}

fn assert_invariants(store: &FilterStore) {
    for facet in FACETS {
        let values = store.values(facet);
        let present = store.state().iter().any(|(key, _)| key == *facet);
        assert_eq!(present, !values.is_empty(), "facet {facet}");
        assert_eq!(store.tags(facet).len(), values.len(), "facet {facet}");
        for (tag, value) in store.tags(facet).iter().zip(values) {
            assert_eq!(&tag.text, value);
        }
    }
}

#[test]
fn keys_present_only_while_non_empty() {
    for seed in 0..25 {
        let mut rng = Lcg(seed);
        let mut store = FilterStore::new();
        for _ in 0..60 {
            let facet = FACETS[rng.next(FACETS.len())];
            let value = VALUES[rng.next(VALUES.len())];
            match rng.next(4) {
                0 | 1 => store.toggle_value(facet, value, rng.next(2) == 0),
                2 => store.add_tag(facet, Tag::new(value)),
                _ => {
                    let index = if rng.next(2) == 0 {
                        TagIndex::Last
                    } else {
                        TagIndex::At(rng.next(4))
                    };
                    store.remove_tag(facet, index);
                }
            }
            assert_invariants(&store);
        }
    }
}

#[test]
fn add_then_remove_last_restores_state() {
    let mut store = FilterStore::new();
    store.toggle_value("area_type", "Statewide", true);
    store.add_tag("area", Tag::new("Ohio"));
    let before = store.state().clone();
    let before_tags = store.tags("area").to_vec();

    store.add_tag("area", Tag::new("Texas"));
    store.remove_tag("area", TagIndex::Last);
    assert_eq!(store.state(), &before);
    assert_eq!(store.tags("area"), before_tags.as_slice());

    store.add_tag("period", Tag::new("2017-01"));
    store.remove_tag("period", TagIndex::Last);
    assert_eq!(store.state(), &before);
}

#[test]
fn cleared_store_serializes_to_empty() {
    let mut store = FilterStore::new();
    store.toggle_value("measure_type", "Labor Force", true);
    store.add_tag("label", Tag::new("2017 Jan"));
    store.clear();
    assert_eq!(query::serialize(store.state()), "");
}

#[test]
fn serialize_is_deterministic_and_parses_back() {
    let mut store = FilterStore::new();
    store.add_tag("label", Tag::new("5% & up"));
    store.add_tag("area", Tag::new("A|B=C"));
    store.toggle_value("area", "Ohio", true);

    let first = query::serialize(store.state());
    let second = query::serialize(store.state());
    assert_eq!(first, second);
    assert_eq!(first, "label=5%25%20%26%20up&area=A%7CB%3DC|Ohio");
    assert_eq!(&query::parse(&first).unwrap(), store.state());
}
