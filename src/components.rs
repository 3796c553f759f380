use serde::{Deserialize, Serialize};

/// Bounds of the world in continuous units; positions live in
/// `[0, width] x [0, height]`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Arena {
    pub width: f32,
    pub height: f32,
}

impl Arena {
    pub fn new(width: usize, height: usize) -> Self {
        Self {
            width: width as f32,
            height: height as f32,
        }
    }

    /// An arena without area: nothing moves in it.
    pub fn is_degenerate(&self) -> bool {
        !(self.width > 0.0 && self.height > 0.0)
    }

    pub fn center(&self) -> (f32, f32) {
        (self.width / 2.0, self.height / 2.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Nest {
    pub x: f32,
    pub y: f32,
    pub radius: f32,
}

impl Nest {
    pub fn at_center(arena: Arena, radius: f32) -> Self {
        let (x, y) = arena.center();
        Self { x, y, radius }
    }

    /// Ants drop off food inside half the nest's display size.
    pub fn contains(&self, x: f32, y: f32) -> bool {
        distance(self.x, self.y, x, y) < self.radius / 2.0
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FoodSource {
    pub x: f32,
    pub y: f32,
    pub radius: f32,
    pub amount: f32,
    pub max_amount: f32,
}

impl FoodSource {
    pub fn new(x: f32, y: f32, radius: f32, amount: f32) -> Self {
        Self {
            x,
            y,
            radius,
            amount,
            max_amount: amount,
        }
    }

    /// Depleted sources stay in the list but are ignored by ants.
    pub fn is_active(&self) -> bool {
        self.amount > 0.0
    }

    pub fn in_reach(&self, x: f32, y: f32) -> bool {
        distance(self.x, self.y, x, y) < self.radius / 2.0
    }

    /// Removes up to `quantity`, never going below zero. Returns what was taken.
    pub fn take(&mut self, quantity: f32) -> f32 {
        let taken = quantity.min(self.amount).max(0.0);
        self.amount -= taken;
        taken
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ForagingState {
    Searching,
    Returning,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TrailPoint {
    pub x: f32,
    pub y: f32,
    pub strength: f32,
}

/// Points laid during one trail run, oldest first.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TrailMemory {
    points: Vec<TrailPoint>,
}

impl TrailMemory {
    pub const CAPACITY: usize = 100;

    /// Starts a new run whose first point is `origin`.
    pub fn begin_run(&mut self, origin: TrailPoint) {
        self.points.clear();
        self.points.push(origin);
    }

    /// Records a deposit with strength fading linearly over the run.
    /// Returns `false` once the run is full.
    pub fn record(&mut self, x: f32, y: f32, base_strength: f32) -> bool {
        let len = self.points.len();
        if len >= Self::CAPACITY {
            return false;
        }
        let strength = base_strength * (1.0 - len as f32 / Self::CAPACITY as f32);
        self.points.push(TrailPoint { x, y, strength });
        true
    }

    pub fn points(&self) -> &[TrailPoint] {
        &self.points
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }
}

pub fn distance(ax: f32, ay: f32, bx: f32, by: f32) -> f32 {
    (ax - bx).hypot(ay - by)
}
