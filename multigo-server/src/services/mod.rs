pub mod room_actions;
pub mod room_sweep;
pub mod state_serializer;
