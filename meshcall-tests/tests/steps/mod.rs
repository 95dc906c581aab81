mod leave_steps;
mod media_steps;
mod mesh_steps;
mod signaling_steps;
