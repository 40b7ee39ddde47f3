pub mod http_face_client;
