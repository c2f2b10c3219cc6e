pub mod synthetic_scene;
