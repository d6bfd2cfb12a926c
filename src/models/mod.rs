pub mod trip;
