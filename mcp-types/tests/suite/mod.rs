mod initialize;
mod progress_notification;
mod result_shapes;
mod round_trip;
