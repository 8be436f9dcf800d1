/*! Integration tests for the MEREF portal library.
 *
 * This test suite is organized as a single integration test binary
 * following the pattern described by matklad in
 * https://matklad.github.io/2021/02/27/delete-cargo-integration-tests.html
 *
 * The module structure mirrors the main library structure:
 * - guard: Route guard decisions over real sessions and permissions
 * - session: SessionProvider following identity sources
 * - store: Encrypted settings over in-memory and file storage
 * - directory: Account directory logins and change notifications
 */

use tracing_subscriber::EnvFilter;

#[ctor::ctor]
fn init_test_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::from_default_env().add_directive("meref_portal=info".parse().unwrap()),
        )
        .with_test_writer()
        .try_init();
}

mod directory;
mod guard;
mod helpers;
mod session;
mod store;
