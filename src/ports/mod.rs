pub mod rental_store;
