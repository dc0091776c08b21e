// Example: a fixed-row list with dividers, driven frame by frame.
use sticky_headers::{
    ChangeObserver, DataSource, ItemType, LayoutOracle, Point, SourceId, StickyHeaderSurface,
    StickyHeaders, StickyOptions, StructuralChange, SubscriptionId, Viewport,
};

const ROW: ItemType = 0;
const SECTION: ItemType = 1;

struct Contacts {
    types: Vec<ItemType>,
    observers: Vec<ChangeObserver>,
}

impl DataSource for Contacts {
    fn source_id(&self) -> SourceId {
        SourceId(1)
    }

    fn item_count(&self) -> usize {
        self.types.len()
    }

    fn item_type(&self, index: usize) -> ItemType {
        self.types[index]
    }

    fn subscribe(&mut self, observer: ChangeObserver) -> SubscriptionId {
        self.observers.push(observer);
        SubscriptionId(self.observers.len() as u64 - 1)
    }

    fn unsubscribe(&mut self, _subscription: SubscriptionId) {}
}

/// Rows are 20px tall with a 2px divider below each.
struct Rows {
    scroll: f32,
    count: usize,
}

impl LayoutOracle for Rows {
    fn item_under(&self, point: Point) -> Option<usize> {
        let y = self.scroll + point.y;
        let index = (y / 22.0) as usize;
        let in_divider = y - index as f32 * 22.0 >= 20.0;
        (!in_divider && index < self.count).then_some(index)
    }
}

#[derive(Default)]
struct Overlay {
    shown: Option<usize>,
}

impl StickyHeaderSurface for Overlay {
    fn set_visible(&mut self, visible: bool) {
        println!("  overlay visible={visible}");
    }

    fn push_data(&mut self, header_index: usize) {
        println!("  overlay shows section #{header_index}");
        self.shown = Some(header_index);
    }

    fn reset(&mut self) {
        println!("  overlay reset");
    }

    fn height(&self) -> f32 {
        20.0
    }

    fn vertical_offset(&self) -> f32 {
        0.0
    }
}

fn main() {
    let mut contacts = Contacts {
        types: (0..40)
            .map(|i| if i % 8 == 0 { SECTION } else { ROW })
            .collect(),
        observers: Vec::new(),
    };
    let mut sticky = StickyHeaders::new(StickyOptions::new(SECTION), Overlay::default());
    let viewport = Viewport::new(320.0, 200.0);

    for scroll in [0.0, 21.0, 100.0, 190.0, 60.0] {
        let rows = Rows {
            scroll,
            count: contacts.types.len(),
        };
        let outcome = sticky.on_draw(Some(&mut contacts), &rows, viewport);
        println!("scroll={scroll}: {outcome:?}");
    }

    // Prepend a row; the source notifies its observers.
    contacts.types.insert(0, ROW);
    for observer in &contacts.observers {
        observer.notify(StructuralChange::Inserted { start: 0, count: 1 });
    }
    let rows = Rows {
        scroll: 60.0,
        count: contacts.types.len(),
    };
    let outcome = sticky.on_draw(Some(&mut contacts), &rows, viewport);
    println!("after insert: {outcome:?}, shown={:?}", sticky.surface().shown);
}
