fn main() {
    // Propagates the ESP-IDF link args when cross-building; a no-op on
    // host-target test builds.
    embuild::espidf::sysenv::output();
}
