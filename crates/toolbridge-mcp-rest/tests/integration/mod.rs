mod api;
mod client;
