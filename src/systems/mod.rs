mod cell;
pub use self::cell::SimulationBox;
