/// The numeric class a label token resolves to.
pub type Code = u32;

/// A single labeled acceleration sample.
#[derive(Debug, Clone, PartialEq)]
pub struct Record {
    label: Code,
    acceleration: Vec<f32>,
}

impl Record {
    /// Creates a new `Record`.
    ///
    /// # Arguments
    /// * `label` - The class code of the sample.
    /// * `acceleration` - The axis values, ordered `x, y, z` per time sub-sample.
    pub fn new(label: Code, acceleration: Vec<f32>) -> Self {
        Self {
            label,
            acceleration,
        }
    }

    pub fn label(&self) -> Code {
        self.label
    }

    pub fn acceleration(&self) -> &[f32] {
        &self.acceleration
    }
}

/// The records recovered by a single parse, in input line order.
#[derive(Debug, Clone, PartialEq)]
pub struct Dataset {
    width: usize,
    records: Vec<Record>,
}

impl Dataset {
    /// Creates an empty `Dataset` whose records all hold `width` values.
    pub fn new(width: usize) -> Self {
        Self {
            width,
            records: Vec::new(),
        }
    }

    /// Appends a record.
    ///
    /// # Panics
    /// If the record's acceleration length differs from the dataset width.
    pub(crate) fn push(&mut self, record: Record) {
        assert_eq!(
            record.acceleration.len(),
            self.width,
            "record width must match the dataset width"
        );

        self.records.push(record);
    }

    /// The amount of values every record holds.
    pub fn width(&self) -> usize {
        self.width
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn records(&self) -> &[Record] {
        &self.records
    }

    pub fn iter(&self) -> impl Iterator<Item = &Record> {
        self.records.iter()
    }
}
