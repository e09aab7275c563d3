
mod state_buffered;
