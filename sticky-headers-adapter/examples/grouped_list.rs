use sticky_headers::{
    ChangeObserver, DataSource, ItemType, SourceId, StickyHeaderSurface, StickyOptions,
    StructuralChange, SubscriptionId, Viewport,
};
use sticky_headers_adapter::{Controller, ListGeometry};

const ROW: ItemType = 0;
const SECTION: ItemType = 1;

struct Inbox {
    types: Vec<ItemType>,
    observers: Vec<(SubscriptionId, ChangeObserver)>,
    next: u64,
}

impl Inbox {
    fn sizes(&self) -> Vec<u32> {
        self.types
            .iter()
            .map(|&t| if t == SECTION { 24 } else { 48 })
            .collect()
    }

    fn insert(&mut self, at: usize, item_type: ItemType) {
        self.types.insert(at, item_type);
        for (_, observer) in &self.observers {
            observer.notify(StructuralChange::Inserted { start: at, count: 1 });
        }
    }
}

impl DataSource for Inbox {
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
        let id = SubscriptionId(self.next);
        self.next += 1;
        self.observers.push((id, observer));
        id
    }

    fn unsubscribe(&mut self, subscription: SubscriptionId) {
        self.observers.retain(|(id, _)| *id != subscription);
    }
}

#[derive(Default)]
struct Banner {
    label: Option<usize>,
}

impl StickyHeaderSurface for Banner {
    fn set_visible(&mut self, visible: bool) {
        println!("  banner visible={visible}");
    }

    fn push_data(&mut self, header_index: usize) {
        self.label = Some(header_index);
        println!("  banner -> section at #{header_index}");
    }

    fn reset(&mut self) {
        println!("  banner reset");
    }

    fn height(&self) -> f32 {
        24.0
    }

    fn vertical_offset(&self) -> f32 {
        0.0
    }
}

fn main() {
    // Example: "Today / Yesterday / Earlier" style sections, a header followed by 6 messages.
    let mut inbox = Inbox {
        types: (0..60)
            .map(|i| if i % 7 == 0 { SECTION } else { ROW })
            .collect(),
        observers: Vec::new(),
        next: 0,
    };
    let geometry =
        ListGeometry::linear(inbox.sizes(), 1).with_viewport(Viewport::new(360.0, 480.0));
    let mut c = Controller::new(StickyOptions::new(SECTION), Banner::default(), geometry);

    for offset in [0u64, 30, 300, 349, 900, 120] {
        let applied = c.on_scroll(offset);
        let outcome = c.draw(Some(&mut inbox));
        println!("scroll={applied}: {outcome:?}");
    }

    // New mail arrives at the top: the data source notifies the subscribed observer, the host
    // relays out the list, and the next frame re-resolves the section.
    inbox.insert(1, ROW);
    let sizes = inbox.sizes();
    c.geometry_mut().set_item_sizes(sizes);
    let outcome = c.draw(Some(&mut inbox));
    println!("after new mail: {outcome:?}");
    println!("banner={:?}", c.sticky().surface().label);
    println!("snapshot={:?}", c.sticky().snapshot());
}
