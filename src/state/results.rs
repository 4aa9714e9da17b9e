/// Result sets returned by the inference endpoint and the six slots they fill

use iced::widget::image::Handle;
use serde_json::Value;

use super::data::Slot;

/// Ordered image references returned by one inference call
///
/// Each element is normally either a URL string or a record with a `url`
/// field. Elements are kept as raw JSON so malformed entries can be skipped
/// slot by slot instead of failing the whole response.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ResultSet(Vec<Value>);

impl ResultSet {
    pub fn new(items: Vec<Value>) -> Self {
        Self(items)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Image reference for a slot, if the element at its position is usable
    pub fn source_for(&self, slot: Slot) -> Option<String> {
        self.0.get(slot.index()).and_then(image_source)
    }
}

impl From<Vec<Value>> for ResultSet {
    fn from(items: Vec<Value>) -> Self {
        Self(items)
    }
}

/// Extract the image reference from one result element
///
/// Accepts a record with a non-empty `url` string, or a raw string.
pub fn image_source(value: &Value) -> Option<String> {
    match value {
        Value::Object(record) => match record.get("url") {
            Some(Value::String(url)) if !url.is_empty() => Some(url.clone()),
            _ => None,
        },
        Value::String(raw) => Some(raw.clone()),
        _ => None,
    }
}

/// What one slot currently shows
#[derive(Debug, Clone, Default)]
pub struct SlotImage {
    /// Reference the slot was last assigned
    pub source: Option<String>,
    /// Decoded image, once the source has been loaded
    pub image: Option<Handle>,
    /// Loading the current source failed
    pub failed: bool,
}

/// The six display slots
#[derive(Debug, Clone, Default)]
pub struct ResultSlots {
    slots: [SlotImage; 6],
}

impl ResultSlots {
    /// Assign a result set positionally
    ///
    /// Slots whose element is unusable keep whatever they showed before.
    /// Returns the (slot, source) pairs that were assigned and need loading.
    pub fn apply(&mut self, results: &ResultSet) -> Vec<(Slot, String)> {
        let mut assigned = Vec::new();

        for slot in Slot::ALL {
            if let Some(source) = results.source_for(slot) {
                self.slots[slot.index()] = SlotImage {
                    source: Some(source.clone()),
                    image: None,
                    failed: false,
                };
                assigned.push((slot, source));
            }
        }

        assigned
    }

    pub fn get(&self, slot: Slot) -> &SlotImage {
        &self.slots[slot.index()]
    }

    pub fn source(&self, slot: Slot) -> Option<&str> {
        self.slots[slot.index()].source.as_deref()
    }

    /// Store a decoded image if the slot still points at `source`
    pub fn set_loaded(&mut self, slot: Slot, source: &str, image: Handle) -> bool {
        let entry = &mut self.slots[slot.index()];
        if entry.source.as_deref() != Some(source) {
            return false;
        }
        entry.image = Some(image);
        entry.failed = false;
        true
    }

    /// Mark the slot as failed if it still points at `source`
    pub fn set_failed(&mut self, slot: Slot, source: &str) -> bool {
        let entry = &mut self.slots[slot.index()];
        if entry.source.as_deref() != Some(source) {
            return false;
        }
        entry.image = None;
        entry.failed = true;
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_image_source_accepts_strings_and_url_records() {
        assert_eq!(image_source(&json!("a.png")), Some("a.png".to_string()));
        assert_eq!(
            image_source(&json!({"url": "https://x/b.png", "path": "/tmp/b.png"})),
            Some("https://x/b.png".to_string())
        );
    }

    #[test]
    fn test_image_source_rejects_everything_else() {
        assert_eq!(image_source(&json!(null)), None);
        assert_eq!(image_source(&json!(42)), None);
        assert_eq!(image_source(&json!(["a"])), None);
        assert_eq!(image_source(&json!({"path": "/tmp/c.png"})), None);
        assert_eq!(image_source(&json!({"url": ""})), None);
        assert_eq!(image_source(&json!({"url": 5})), None);
    }

    #[test]
    fn test_apply_ignores_extra_and_missing_elements() {
        let mut slots = ResultSlots::default();
        slots.apply(&ResultSet::from(vec![
            json!("a"), json!("b"), json!("c"), json!("d"), json!("e"), json!("f"),
        ]));

        // Short result set only touches the first two slots; the seventh element is never read
        let assigned = slots.apply(&ResultSet::from(vec![json!("x"), json!({"url": "y"})]));
        assert_eq!(assigned, vec![(Slot::Resized, "x".to_string()), (Slot::Grayscale, "y".to_string())]);
        assert_eq!(slots.source(Slot::Denoised), Some("c"));
        assert_eq!(slots.source(Slot::Edges), Some("f"));

        let assigned = slots.apply(&ResultSet::from(vec![
            json!(1), json!(2), json!(3), json!(4), json!(5), json!(6), json!("g"),
        ]));
        assert!(assigned.is_empty());
        assert_eq!(slots.source(Slot::Resized), Some("x"));
    }

    #[test]
    fn test_stale_load_is_discarded() {
        let mut slots = ResultSlots::default();
        slots.apply(&ResultSet::from(vec![json!("first")]));
        slots.apply(&ResultSet::from(vec![json!("second")]));

        let handle = Handle::from_bytes(vec![0u8; 4]);
        assert!(!slots.set_loaded(Slot::Resized, "first", handle.clone()));
        assert!(slots.get(Slot::Resized).image.is_none());

        assert!(slots.set_loaded(Slot::Resized, "second", handle));
        assert!(slots.get(Slot::Resized).image.is_some());
    }

    #[test]
    fn test_failed_load_marks_slot() {
        let mut slots = ResultSlots::default();
        slots.apply(&ResultSet::from(vec![json!("a")]));

        assert!(slots.set_failed(Slot::Resized, "a"));
        assert!(slots.get(Slot::Resized).failed);
        assert!(!slots.set_failed(Slot::Grayscale, "a"));
    }
}
