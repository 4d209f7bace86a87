use crate::mpris::MprisHandle;
use crate::player::PlayerController;

pub fn update_mpris(mpris: &MprisHandle, controller: &PlayerController) {
    let transport = controller.transport();
    let track = transport
        .current
        .and_then(|i| controller.catalog().get(i).ok());
    mpris.set_track_metadata(transport.current, track);
    mpris.set_playback(transport.phase);
}
