mod red;
mod scenario;
mod sim_time;
