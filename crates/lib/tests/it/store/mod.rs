mod biometric;
mod secure_store;
