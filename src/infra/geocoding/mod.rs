pub mod google_maps_client;
