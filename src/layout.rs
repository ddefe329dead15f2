//! KLE layout rows → positioned keys.
//!
//! Vial definitions describe the physical layout as KLE (keyboard-layout-editor)
//! rows: every string is a key whose first legend line is its `"row,col"`
//! matrix position, and every object adjusts the cursor for the keys after it.
//!
//! The walk is a fold over an immutable [`Cursor`]: a property object yields a
//! new cursor, a label yields a [`Key`] plus the advanced cursor.

use serde::Serialize;
use serde_json::{Map, Value};

/// One physical key slot, in KLE units
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Key {
    pub x: f64,
    pub y: f64,
    pub w: f64,
    pub h: f64,
    pub x2: f64,
    pub y2: f64,
    pub w2: f64,
    pub h2: f64,
    /// Degrees, clockwise
    pub rotation_angle: f64,
    pub rotation_x: f64,
    pub rotation_y: f64,
    /// Matrix position; `None` for keys without a `"row,col"` legend
    pub row: Option<u32>,
    pub col: Option<u32>,
    /// Raw KLE legend text
    pub label: String,
    pub decal: bool,
    pub ghost: bool,
    pub stepped: bool,
    pub nub: bool,
}

impl Key {
    /// Matrix position if the key has one
    pub fn matrix(&self) -> Option<(u32, u32)> {
        Some((self.row?, self.col?))
    }

    pub fn is_rotated(&self) -> bool {
        self.rotation_angle != 0.0
    }
}

/// Accumulated KLE state between items
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Cursor {
    pub x: f64,
    pub y: f64,
    pub w: f64,
    pub h: f64,
    pub x2: f64,
    pub y2: f64,
    pub w2: f64,
    pub h2: f64,
    pub rotation_angle: f64,
    pub rotation_x: f64,
    pub rotation_y: f64,
    /// Origin of the current rotation cluster
    pub cluster_x: f64,
    pub cluster_y: f64,
    pub decal: bool,
    pub ghost: bool,
    pub stepped: bool,
    pub nub: bool,
}

impl Default for Cursor {
    fn default() -> Self {
        Self {
            x: 0.0,
            y: 0.0,
            w: 1.0,
            h: 1.0,
            x2: 0.0,
            y2: 0.0,
            w2: 1.0,
            h2: 1.0,
            rotation_angle: 0.0,
            rotation_x: 0.0,
            rotation_y: 0.0,
            cluster_x: 0.0,
            cluster_y: 0.0,
            decal: false,
            ghost: false,
            stepped: false,
            nub: false,
        }
    }
}

fn number(props: &Map<String, Value>, name: &str) -> Option<f64> {
    props.get(name).and_then(Value::as_f64)
}

fn flag(props: &Map<String, Value>, name: &str) -> Option<bool> {
    props.get(name).and_then(Value::as_bool)
}

impl Cursor {
    /// Apply a KLE property object
    ///
    /// Order matters: `rx`/`ry` move the cursor to the new cluster origin
    /// before relative `x`/`y` offsets are added. Values of the wrong type are
    /// ignored.
    pub fn apply(self, props: &Map<String, Value>) -> Self {
        let mut next = self;

        if let Some(rx) = number(props, "rx") {
            next.rotation_x = rx;
            next.cluster_x = rx;
            next.x = next.cluster_x;
            next.y = next.cluster_y;
        }
        if let Some(ry) = number(props, "ry") {
            next.rotation_y = ry;
            next.cluster_y = ry;
            next.x = next.cluster_x;
            next.y = next.cluster_y;
        }
        if let Some(r) = number(props, "r") {
            next.rotation_angle = r;
        }

        if let Some(x) = number(props, "x") {
            next.x += x;
        }
        if let Some(y) = number(props, "y") {
            next.y += y;
        }
        if let Some(w) = number(props, "w") {
            next.w = w;
            next.w2 = w;
        }
        if let Some(h) = number(props, "h") {
            next.h = h;
            next.h2 = h;
        }

        // secondary rectangle (ISO enter, big-ass enter)
        if let Some(x2) = number(props, "x2") {
            next.x2 = x2;
        }
        if let Some(y2) = number(props, "y2") {
            next.y2 = y2;
        }
        if let Some(w2) = number(props, "w2") {
            next.w2 = w2;
        }
        if let Some(h2) = number(props, "h2") {
            next.h2 = h2;
        }
        if let Some(l) = flag(props, "l") {
            next.stepped = l;
        }
        if let Some(n) = flag(props, "n") {
            next.nub = n;
        }

        if let Some(d) = flag(props, "d") {
            next.decal = d;
        }
        if let Some(g) = flag(props, "g") {
            next.ghost = g;
        }
        next
    }

    /// Emit a key at the cursor, then advance past it and reset per-key state
    pub fn place(self, label: &str) -> (Key, Self) {
        let (row, col) = match parse_matrix_label(label) {
            Some((r, c)) => (Some(r), Some(c)),
            None => (None, None),
        };
        let key = Key {
            x: self.x,
            y: self.y,
            w: self.w,
            h: self.h,
            x2: self.x2,
            y2: self.y2,
            w2: self.w2,
            h2: self.h2,
            rotation_angle: self.rotation_angle,
            rotation_x: self.rotation_x,
            rotation_y: self.rotation_y,
            row,
            col,
            label: label.to_string(),
            decal: self.decal,
            ghost: self.ghost,
            stepped: self.stepped,
            nub: self.nub,
        };

        let next = Self {
            x: self.x + self.w,
            w: 1.0,
            h: 1.0,
            x2: 0.0,
            y2: 0.0,
            w2: 1.0,
            h2: 1.0,
            decal: false,
            ghost: false,
            stepped: false,
            nub: false,
            ..self
        };
        (key, next)
    }

    /// Move to the next row; x returns to the cluster's rotation origin
    pub fn end_row(self) -> Self {
        Self {
            y: self.y + 1.0,
            x: self.rotation_x,
            ..self
        }
    }
}

/// Parse `"row,col"` from the first legend line
///
/// The line must hold exactly one comma with an unsigned integer on each
/// side; anything else means the key has no matrix position.
pub fn parse_matrix_label(label: &str) -> Option<(u32, u32)> {
    let first = label.lines().next()?;
    let (row, col) = first.split_once(',')?;
    if col.contains(',') {
        return None;
    }
    let row = row.trim().parse().ok()?;
    let col = col.trim().parse().ok()?;
    Some((row, col))
}

/// Build the ordered key list from KLE rows
///
/// Non-array rows (such as a leading keyboard-metadata object) are skipped
/// without advancing the row. Emission order is label order.
pub fn parse_layout(rows: &[Value]) -> Vec<Key> {
    let mut keys = Vec::new();
    let mut cursor = Cursor::default();

    for row in rows {
        let Some(items) = row.as_array() else {
            continue;
        };
        for item in items {
            match item {
                Value::String(label) => {
                    let (key, next) = cursor.place(label);
                    keys.push(key);
                    cursor = next;
                }
                Value::Object(props) => cursor = cursor.apply(props),
                _ => {}
            }
        }
        cursor = cursor.end_row();
    }

    keys
}
